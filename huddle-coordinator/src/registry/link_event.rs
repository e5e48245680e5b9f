use crate::registry::LinkState;
use huddle_core::ParticipantId;

/// Lifecycle notifications published to
/// [`LinkObserver`](crate::registry::LinkObserver) subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    LinkAdded {
        remote_id: ParticipantId,
    },
    StateChanged {
        remote_id: ParticipantId,
        from: LinkState,
        to: LinkState,
    },
    LinkFailed {
        remote_id: ParticipantId,
        reason: String,
    },
}

impl LinkEvent {
    pub fn remote_id(&self) -> &ParticipantId {
        match self {
            Self::LinkAdded { remote_id }
            | Self::StateChanged { remote_id, .. }
            | Self::LinkFailed { remote_id, .. } => remote_id,
        }
    }
}
