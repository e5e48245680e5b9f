use crate::error::CoordinatorError;
use crate::negotiation::{NegotiationEvent, NegotiationFactory};
use crate::registry::{LinkEvent, LinkObserver, LinkSnapshot, LinkState, PeerLink};
use huddle_core::{IceCandidate, ParticipantId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Candidates held for one participant that has no link yet.
pub const MAX_ORPHAN_CANDIDATES_PER_PEER: usize = 32;

/// Participants for which candidates are held without a link.
pub const MAX_ORPHAN_PEERS: usize = 64;

/// Owns one [`PeerLink`] per remote participant.
///
/// Only the dispatch loop touches the registry; observers read the copies
/// published through [`LinkObserver`].
pub struct PeerRegistry {
    links: HashMap<ParticipantId, PeerLink>,
    orphan_candidates: HashMap<ParticipantId, Vec<IceCandidate>>,
    factory: Arc<dyn NegotiationFactory>,
    events_tx: mpsc::Sender<NegotiationEvent>,
    observer: LinkObserver,
}

impl PeerRegistry {
    pub fn new(
        factory: Arc<dyn NegotiationFactory>,
        events_tx: mpsc::Sender<NegotiationEvent>,
        observer: LinkObserver,
    ) -> Self {
        Self {
            links: HashMap::new(),
            orphan_candidates: HashMap::new(),
            factory,
            events_tx,
            observer,
        }
    }

    pub fn get_or_none(&self, remote_id: &ParticipantId) -> Option<&PeerLink> {
        self.links.get(remote_id)
    }

    pub fn get(&self, remote_id: &ParticipantId) -> Result<&PeerLink, CoordinatorError> {
        self.links
            .get(remote_id)
            .ok_or_else(|| CoordinatorError::UnknownPeer(remote_id.clone()))
    }

    pub fn get_mut(
        &mut self,
        remote_id: &ParticipantId,
    ) -> Result<&mut PeerLink, CoordinatorError> {
        self.links
            .get_mut(remote_id)
            .ok_or_else(|| CoordinatorError::UnknownPeer(remote_id.clone()))
    }

    /// Returns the link for `remote_id`, creating it in `Initiating` on a miss.
    ///
    /// A failing factory registers no link. Observers still get a `Failed`
    /// snapshot and a `LinkFailed` event; a later message from the same
    /// participant tries the factory again.
    pub async fn create_if_absent(
        &mut self,
        remote_id: &ParticipantId,
    ) -> Result<&mut PeerLink, CoordinatorError> {
        if !self.links.contains_key(remote_id) {
            let handle = match self.factory.create(remote_id, self.events_tx.clone()).await {
                Ok(handle) => handle,
                Err(e) => return Err(self.refused(remote_id, format!("{e:#}"))),
            };

            let mut link = PeerLink::new(remote_id.clone(), handle);
            if let Some(orphans) = self.orphan_candidates.remove(remote_id) {
                debug!("Adopting {} early candidates for {}", orphans.len(), remote_id);
                link.pending_remote = orphans;
            }

            info!("Link to {} created", remote_id);
            self.observer.publish(link.snapshot());
            self.observer.emit(LinkEvent::LinkAdded {
                remote_id: remote_id.clone(),
            });
            self.links.insert(remote_id.clone(), link);
        }

        self.get_mut(remote_id)
    }

    fn refused(&mut self, remote_id: &ParticipantId, reason: String) -> CoordinatorError {
        self.observer.publish(LinkSnapshot {
            remote_id: remote_id.clone(),
            state: LinkState::Failed,
            data_channel_established: false,
            inbound_track: None,
            failure_reason: Some(reason.clone()),
        });
        self.observer.emit(LinkEvent::LinkFailed {
            remote_id: remote_id.clone(),
            reason: reason.clone(),
        });

        CoordinatorError::NegotiationUnavailable {
            remote_id: remote_id.clone(),
            reason,
        }
    }

    /// Holds a candidate for a participant that has no link yet.
    ///
    /// Returns `false` and drops the candidate once the per-participant or
    /// participant limit is reached.
    pub fn queue_orphan_candidate(
        &mut self,
        remote_id: &ParticipantId,
        candidate: IceCandidate,
    ) -> bool {
        if !self.orphan_candidates.contains_key(remote_id)
            && self.orphan_candidates.len() >= MAX_ORPHAN_PEERS
        {
            return false;
        }

        let queued = self.orphan_candidates.entry(remote_id.clone()).or_default();
        if queued.len() >= MAX_ORPHAN_CANDIDATES_PER_PEER {
            return false;
        }
        queued.push(candidate);
        true
    }

    pub fn orphan_candidates(&self, remote_id: &ParticipantId) -> &[IceCandidate] {
        self.orphan_candidates
            .get(remote_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn all(&self) -> Vec<LinkSnapshot> {
        let mut links: Vec<LinkSnapshot> = self.links.values().map(PeerLink::snapshot).collect();
        links.sort_by(|a, b| a.remote_id.cmp(&b.remote_id));
        links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn observer(&self) -> &LinkObserver {
        &self.observer
    }

    /// Publishes the current snapshot of `remote_id` and reports a state
    /// change relative to `previous`.
    pub fn sync(&self, remote_id: &ParticipantId, previous: LinkState) {
        let Some(link) = self.links.get(remote_id) else {
            return;
        };
        self.observer.publish(link.snapshot());

        if link.state == previous {
            return;
        }
        debug!("Link {}: {} -> {}", remote_id, previous, link.state);
        self.observer.emit(LinkEvent::StateChanged {
            remote_id: remote_id.clone(),
            from: previous,
            to: link.state,
        });

        if link.state == LinkState::Failed {
            self.observer.emit(LinkEvent::LinkFailed {
                remote_id: remote_id.clone(),
                reason: link.failure_reason.clone().unwrap_or_default(),
            });
        }
    }

    pub async fn close_all(&mut self) {
        for (remote_id, link) in self.links.drain() {
            if let Err(e) = link.handle.close().await {
                warn!("Failed to close link to {}: {:?}", remote_id, e);
            }
        }
        self.orphan_candidates.clear();
    }
}
