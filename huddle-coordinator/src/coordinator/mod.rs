mod coordinator;
mod coordinator_config;
mod coordinator_handle;
mod outbound;

pub use coordinator::*;
pub use coordinator_config::*;
pub use coordinator_handle::*;
