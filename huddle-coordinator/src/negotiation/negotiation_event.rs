use huddle_core::{IceCandidate, ParticipantId, TrackRef};

/// Events a negotiation capability reports for one link.
///
/// They are delivered on the coordinator's event channel and applied by the
/// dispatch loop, never by the capability itself.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationEvent {
    /// A local candidate was gathered and may need to go to the remote side.
    LocalCandidate(ParticipantId, IceCandidate),

    /// The data channel to the remote side is open.
    DataChannelOpen(ParticipantId),

    /// The remote side started sending a media track.
    RemoteTrack(ParticipantId, TrackRef),

    /// The underlying connection failed and will not recover on its own.
    ConnectionLost(ParticipantId),
}

impl NegotiationEvent {
    pub fn remote_id(&self) -> &ParticipantId {
        match self {
            Self::LocalCandidate(id, _)
            | Self::DataChannelOpen(id)
            | Self::RemoteTrack(id, _)
            | Self::ConnectionLost(id) => id,
        }
    }
}
