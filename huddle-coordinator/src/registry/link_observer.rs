use crate::registry::{LinkEvent, LinkSnapshot};
use dashmap::DashMap;
use huddle_core::ParticipantId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Shared read side of the peer registry.
///
/// Cloning is cheap; every clone sees the same snapshots and subscriber set.
#[derive(Clone, Default)]
pub struct LinkObserver {
    snapshots: Arc<DashMap<ParticipantId, LinkSnapshot>>,
    subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<LinkEvent>>>,
    next_id: Arc<AtomicU64>,
}

impl LinkObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> LinkSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, tx);

        LinkSubscription {
            id,
            rx,
            subscribers: self.subscribers.clone(),
        }
    }

    /// Snapshots of every link, sorted by remote id.
    pub fn all(&self) -> Vec<LinkSnapshot> {
        let mut links: Vec<LinkSnapshot> = self
            .snapshots
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        links.sort_by(|a, b| a.remote_id.cmp(&b.remote_id));
        links
    }

    pub fn get(&self, remote_id: &ParticipantId) -> Option<LinkSnapshot> {
        self.snapshots.get(remote_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub(crate) fn publish(&self, snapshot: LinkSnapshot) {
        self.snapshots.insert(snapshot.remote_id.clone(), snapshot);
    }

    pub(crate) fn emit(&self, event: LinkEvent) {
        let mut dead = Vec::new();
        for entry in self.subscribers.iter() {
            if entry.value().send(event.clone()).is_err() {
                dead.push(*entry.key());
            }
        }
        for id in dead {
            self.subscribers.remove(&id);
        }
    }

    /// Ends every subscription; their `recv` returns `None` once drained.
    pub(crate) fn close(&self) {
        self.subscribers.clear();
    }
}

/// Receiving end of [`LinkObserver::subscribe`]. Dropping it unsubscribes.
pub struct LinkSubscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<LinkEvent>,
    subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<LinkEvent>>>,
}

impl LinkSubscription {
    pub async fn recv(&mut self) -> Option<LinkEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<LinkEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for LinkSubscription {
    fn drop(&mut self) {
        self.subscribers.remove(&self.id);
    }
}
