mod link_event;
mod link_observer;
mod peer_link;
mod peer_registry;

pub use link_event::*;
pub use link_observer::*;
pub use peer_link::*;
pub use peer_registry::*;
