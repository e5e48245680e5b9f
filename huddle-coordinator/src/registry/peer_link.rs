use crate::error::CoordinatorError;
use crate::negotiation::NegotiationHandle;
use huddle_core::{IceCandidate, ParticipantId, TrackRef};
use std::fmt;

/// Negotiation progress of one peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    Initiating,
    OfferSent,
    OfferReceived,
    AnswerSent,
    AnswerReceived,
    Connected,
    Failed,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Read-only copy of a [`PeerLink`] handed to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSnapshot {
    pub remote_id: ParticipantId,
    pub state: LinkState,
    pub data_channel_established: bool,
    pub inbound_track: Option<TrackRef>,
    pub failure_reason: Option<String>,
}

/// Everything the coordinator knows about one remote participant.
///
/// The negotiation handle is created with the link and never replaced.
pub struct PeerLink {
    pub(crate) remote_id: ParticipantId,
    /// Id this side used when it first spoke on the link.
    pub(crate) local_id: Option<ParticipantId>,
    pub(crate) handle: Box<dyn NegotiationHandle>,
    pub(crate) state: LinkState,
    pub(crate) data_channel_established: bool,
    pub(crate) inbound_track: Option<TrackRef>,
    pub(crate) remote_description_set: bool,
    pub(crate) forwarding_armed: bool,
    pub(crate) pending_remote: Vec<IceCandidate>,
    pub(crate) pending_local: Vec<IceCandidate>,
    pub(crate) failure_reason: Option<String>,
}

impl PeerLink {
    pub(crate) fn new(remote_id: ParticipantId, handle: Box<dyn NegotiationHandle>) -> Self {
        Self {
            remote_id,
            local_id: None,
            handle,
            state: LinkState::Initiating,
            data_channel_established: false,
            inbound_track: None,
            remote_description_set: false,
            forwarding_armed: false,
            pending_remote: Vec::new(),
            pending_local: Vec::new(),
            failure_reason: None,
        }
    }

    pub fn remote_id(&self) -> &ParticipantId {
        &self.remote_id
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn data_channel_established(&self) -> bool {
        self.data_channel_established
    }

    pub fn inbound_track(&self) -> Option<&TrackRef> {
        self.inbound_track.as_ref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Remote candidates waiting for a remote description.
    pub fn queued_remote_candidates(&self) -> &[IceCandidate] {
        &self.pending_remote
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot {
            remote_id: self.remote_id.clone(),
            state: self.state,
            data_channel_established: self.data_channel_established,
            inbound_track: self.inbound_track.clone(),
            failure_reason: self.failure_reason.clone(),
        }
    }

    pub(crate) fn expect_state(
        &self,
        allowed: &[LinkState],
        operation: &'static str,
    ) -> Result<(), CoordinatorError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(CoordinatorError::InvalidStateTransition {
            remote_id: self.remote_id.clone(),
            state: self.state,
            operation,
        })
    }

    /// Turns a capability result into a coordinator result, failing the link
    /// on error.
    pub(crate) fn settle<T>(&mut self, result: anyhow::Result<T>) -> Result<T, CoordinatorError> {
        result.map_err(|e| self.fail(format!("{e:#}")))
    }

    pub(crate) fn mark_failed(&mut self, reason: String) {
        self.state = LinkState::Failed;
        self.failure_reason = Some(reason);
    }

    pub(crate) fn fail(&mut self, reason: String) -> CoordinatorError {
        self.mark_failed(reason.clone());
        CoordinatorError::NegotiationUnavailable {
            remote_id: self.remote_id.clone(),
            reason,
        }
    }

    /// Drops the current offer/answer exchange so a new one can start.
    ///
    /// The data channel flag is kept; it describes the transport, not the
    /// exchange.
    pub(crate) fn reset_negotiation(&mut self) {
        self.state = LinkState::Initiating;
        self.remote_description_set = false;
        self.forwarding_armed = false;
    }

    /// Moves to `Connected` once both the answer exchange and the data
    /// channel are done.
    pub(crate) fn promote_if_ready(&mut self) {
        if self.data_channel_established
            && matches!(self.state, LinkState::AnswerSent | LinkState::AnswerReceived)
        {
            self.state = LinkState::Connected;
        }
    }
}

impl fmt::Debug for PeerLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerLink")
            .field("remote_id", &self.remote_id)
            .field("state", &self.state)
            .field("data_channel_established", &self.data_channel_established)
            .field("remote_description_set", &self.remote_description_set)
            .field("forwarding_armed", &self.forwarding_armed)
            .field("pending_remote", &self.pending_remote.len())
            .field("pending_local", &self.pending_local.len())
            .finish_non_exhaustive()
    }
}
