pub use huddle_core::model::{ParticipantId, SignalMessage};

pub mod model {
    pub use huddle_core::model::*;
}

pub mod codec {
    pub use huddle_core::codec::*;
}

#[cfg(feature = "coordinator")]
pub mod coordinator {
    pub use huddle_coordinator::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use huddle_relay::*;
}
