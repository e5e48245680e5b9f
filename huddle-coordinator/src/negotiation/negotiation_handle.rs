use crate::negotiation::NegotiationEvent;
use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{IceCandidate, ParticipantId, SessionDescription};
use tokio::sync::mpsc;

/// Connection-establishment capability for a single peer link.
///
/// The coordinator only drives it; SDP and ICE handling live behind it.
/// A local description of kind `rollback` discards a pending local offer.
#[async_trait]
pub trait NegotiationHandle: Send + Sync {
    async fn create_local_offer(&self) -> Result<SessionDescription>;

    async fn create_local_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Produces a fresh [`NegotiationHandle`] per link.
///
/// `events` must receive every candidate, data channel and track
/// notification for `remote_id`.
#[async_trait]
pub trait NegotiationFactory: Send + Sync {
    async fn create(
        &self,
        remote_id: &ParticipantId,
        events: mpsc::Sender<NegotiationEvent>,
    ) -> Result<Box<dyn NegotiationHandle>>;
}
