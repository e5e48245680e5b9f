use crate::registry::LinkState;
use huddle_core::{DecodeError, ParticipantId};
use thiserror::Error;

/// Everything that can go wrong while dispatching one signaling message.
///
/// None of these stop the dispatch loop: the offending message is dropped,
/// and negotiation failures additionally mark the link `Failed`.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("{operation} is not valid for link {remote_id} in state {state:?}")]
    InvalidStateTransition {
        remote_id: ParticipantId,
        state: LinkState,
        operation: &'static str,
    },

    #[error("no link for participant {0}")]
    UnknownPeer(ParticipantId),

    #[error("negotiation with {remote_id} unavailable: {reason}")]
    NegotiationUnavailable {
        remote_id: ParticipantId,
        reason: String,
    },

    #[error("candidate from {remote_id} rejected: {reason}")]
    CandidateRejected {
        remote_id: ParticipantId,
        reason: String,
    },

    #[error("message addressed to {to} from {from} is not for this participant")]
    Misaddressed {
        to: ParticipantId,
        from: ParticipantId,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("coordinator is no longer running")]
    Closed,
}
