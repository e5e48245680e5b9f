use crate::error::CoordinatorError;
use crate::registry::{LinkObserver, LinkSnapshot};
use bytes::Bytes;
use huddle_core::ParticipantId;
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;

/// Cloneable front door of a running [`Coordinator`](crate::coordinator::Coordinator).
///
/// The coordinator stops once every handle is dropped.
#[derive(Clone)]
pub struct CoordinatorHandle {
    pub(crate) inbound_tx: mpsc::Sender<Bytes>,
    pub(crate) observer: LinkObserver,
    pub(crate) self_id: Arc<OnceLock<ParticipantId>>,
}

impl CoordinatorHandle {
    /// Queues one raw relay frame for dispatch.
    pub async fn deliver(&self, frame: impl Into<Bytes>) -> Result<(), CoordinatorError> {
        self.inbound_tx
            .send(frame.into())
            .await
            .map_err(|_| CoordinatorError::Closed)
    }

    pub fn observer(&self) -> &LinkObserver {
        &self.observer
    }

    pub fn links(&self) -> Vec<LinkSnapshot> {
        self.observer.all()
    }

    /// The id assigned by the first roster, if one has arrived.
    pub fn local_id(&self) -> Option<ParticipantId> {
        self.self_id.get().cloned()
    }
}
