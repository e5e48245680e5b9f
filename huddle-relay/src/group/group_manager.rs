use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::ParticipantId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

pub type MemberSender = mpsc::UnboundedSender<Message>;

type Group = DashMap<ParticipantId, MemberSender>;

/// Live websocket members, grouped by the group id in the URL.
#[derive(Clone, Default)]
pub struct GroupManager {
    groups: Arc<DashMap<String, Group>>,
}

impl GroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member under a freshly generated id.
    ///
    /// Returns the new id and the members that were already in the group.
    pub fn join(
        &self,
        group_id: &str,
        tx: MemberSender,
    ) -> (ParticipantId, BTreeSet<ParticipantId>) {
        let group = self.groups.entry(group_id.to_owned()).or_insert_with(|| {
            info!("Creating new group: {}", group_id);
            DashMap::new()
        });

        let existing = group.iter().map(|member| member.key().clone()).collect();
        let id = ParticipantId::generate();
        group.insert(id.clone(), tx);

        (id, existing)
    }

    /// Removes a member and drops the group once nobody is left.
    pub fn leave(&self, group_id: &str, id: &ParticipantId) {
        let removed = self.groups.remove_if(group_id, |_, group| {
            group.remove(id);
            group.is_empty()
        });

        if removed.is_some() {
            info!("Group {} is empty, removing it", group_id);
        }
    }

    pub fn sender(&self, group_id: &str, id: &ParticipantId) -> Option<MemberSender> {
        let group = self.groups.get(group_id)?;
        let member = group.get(id)?;
        Some(member.clone())
    }

    pub fn members(&self, group_id: &str) -> BTreeSet<ParticipantId> {
        self.groups
            .get(group_id)
            .map(|group| group.iter().map(|member| member.key().clone()).collect())
            .unwrap_or_default()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
