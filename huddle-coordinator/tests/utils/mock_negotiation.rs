use anyhow::{Result, bail};
use async_trait::async_trait;
use huddle_coordinator::{NegotiationEvent, NegotiationFactory, NegotiationHandle};
use huddle_core::{IceCandidate, ParticipantId, SessionDescription};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
struct FactoryState {
    created: Vec<ParticipantId>,
    events: HashMap<ParticipantId, mpsc::Sender<NegotiationEvent>>,
    calls: HashMap<ParticipantId, Vec<String>>,
    refused: HashSet<ParticipantId>,
    failing_calls: HashSet<&'static str>,
}

/// Negotiation capability that records every call instead of touching a
/// network.
#[derive(Clone, Default)]
pub struct MockNegotiationFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl MockNegotiationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create` fail for `remote_id`.
    pub fn refuse(&self, remote_id: &ParticipantId) {
        self.state.lock().unwrap().refused.insert(remote_id.clone());
    }

    /// Make every handle fail the named call (`create_offer`, `set_remote`, ...).
    pub fn fail_on(&self, call: &'static str) {
        self.state.lock().unwrap().failing_calls.insert(call);
    }

    pub fn created(&self) -> Vec<ParticipantId> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn calls_for(&self, remote_id: &ParticipantId) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(remote_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Raise a capability event as if the transport produced it.
    pub async fn emit(&self, event: NegotiationEvent) {
        let tx = self
            .state
            .lock()
            .unwrap()
            .events
            .get(event.remote_id())
            .cloned()
            .expect("no link was created for this event");
        tx.send(event).await.expect("coordinator stopped");
    }
}

#[async_trait]
impl NegotiationFactory for MockNegotiationFactory {
    async fn create(
        &self,
        remote_id: &ParticipantId,
        events: mpsc::Sender<NegotiationEvent>,
    ) -> Result<Box<dyn NegotiationHandle>> {
        let mut state = self.state.lock().unwrap();
        if state.refused.contains(remote_id) {
            bail!("no transport for {remote_id}");
        }
        state.created.push(remote_id.clone());
        state.events.insert(remote_id.clone(), events);
        drop(state);

        Ok(Box::new(MockNegotiationHandle {
            remote_id: remote_id.clone(),
            state: self.state.clone(),
        }))
    }
}

pub struct MockNegotiationHandle {
    remote_id: ParticipantId,
    state: Arc<Mutex<FactoryState>>,
}

impl MockNegotiationHandle {
    fn record(&self, call: &'static str, detail: impl Into<String>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let detail = detail.into();
        let entry = if detail.is_empty() {
            call.to_owned()
        } else {
            format!("{call}:{detail}")
        };
        state
            .calls
            .entry(self.remote_id.clone())
            .or_default()
            .push(entry);

        if state.failing_calls.contains(call) {
            bail!("{call} failed");
        }
        Ok(())
    }
}

#[async_trait]
impl NegotiationHandle for MockNegotiationHandle {
    async fn create_local_offer(&self) -> Result<SessionDescription> {
        self.record("create_offer", "")?;
        Ok(SessionDescription::offer(format!("offer-for-{}", self.remote_id)))
    }

    async fn create_local_answer(&self) -> Result<SessionDescription> {
        self.record("create_answer", "")?;
        Ok(SessionDescription::answer(format!("answer-for-{}", self.remote_id)))
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        self.record("set_local", format!("{:?}", description.kind))
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        self.record("set_remote", format!("{:?}", description.kind))
    }

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.record("add_candidate", candidate.candidate)
    }

    async fn close(&self) -> Result<()> {
        self.record("close", "")
    }
}
