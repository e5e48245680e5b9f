mod participant;
mod session;
mod signaling;

pub use participant::{InvalidParticipantId, ParticipantId};
pub use session::{IceCandidate, SdpKind, SessionDescription, TrackRef};
pub use signaling::{DEFAULT_STUN_SERVERS, IceServerConfig, MessageKind, SignalMessage};
