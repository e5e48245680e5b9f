mod negotiation_driver;
mod negotiation_event;
mod negotiation_handle;

pub use negotiation_driver::*;
pub use negotiation_event::*;
pub use negotiation_handle::*;
