//! Signaling coordinator: turns relay frames into WebRTC offer/answer
//! exchanges, one peer link per remote participant.

pub mod coordinator;
pub mod error;
pub mod negotiation;
pub mod registry;
pub mod signaling;
pub mod transport;

pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorHandle};
pub use error::CoordinatorError;
pub use negotiation::{NegotiationEvent, NegotiationFactory, NegotiationHandle};
pub use registry::{LinkEvent, LinkObserver, LinkSnapshot, LinkState, LinkSubscription};
pub use signaling::{RelayConnection, RelayInbound, RelayOutput, WsRelayOutput};
pub use transport::{TransportConfig, WebRtcNegotiatorFactory};
