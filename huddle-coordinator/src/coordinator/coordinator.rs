use crate::coordinator::outbound::{OutboundQueue, OutboundWriter};
use crate::coordinator::{CoordinatorConfig, CoordinatorHandle};
use crate::error::CoordinatorError;
use crate::negotiation::{GlareOutcome, NegotiationDriver, NegotiationEvent, NegotiationFactory};
use crate::registry::{LinkObserver, LinkState, PeerRegistry};
use crate::signaling::RelayOutput;
use bytes::Bytes;
use huddle_core::{IceCandidate, ParticipantId, SessionDescription, SignalMessage, decode};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Single-owner dispatch loop for one participant.
///
/// Relay frames and negotiation events are processed one at a time, each to
/// completion, so every link sees its operations in arrival order.
pub struct Coordinator {
    registry: PeerRegistry,
    inbound_rx: mpsc::Receiver<Bytes>,
    events_rx: mpsc::Receiver<NegotiationEvent>,
    outbound: OutboundQueue,
    writer: Option<OutboundWriter>,
    relay: Arc<dyn RelayOutput>,
    self_id: Arc<OnceLock<ParticipantId>>,
}

impl Coordinator {
    pub fn new(
        config: CoordinatorConfig,
        factory: Arc<dyn NegotiationFactory>,
        relay: Arc<dyn RelayOutput>,
    ) -> (Self, CoordinatorHandle) {
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity);
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity);
        let (outbound, writer) = OutboundQueue::new();
        let observer = LinkObserver::new();
        let self_id = Arc::new(OnceLock::new());

        let coordinator = Self {
            registry: PeerRegistry::new(factory, events_tx, observer.clone()),
            inbound_rx,
            events_rx,
            outbound,
            writer: Some(writer),
            relay,
            self_id: self_id.clone(),
        };
        let handle = CoordinatorHandle {
            inbound_tx,
            observer,
            self_id,
        };

        (coordinator, handle)
    }

    pub async fn run(mut self) {
        info!("Coordinator event loop started");

        let writer = self
            .writer
            .take()
            .map(|writer| tokio::spawn(writer.run(self.relay.clone())));

        loop {
            tokio::select! {
                frame = self.inbound_rx.recv() => {
                    match frame {
                        Some(f) => self.handle_frame(f).await,
                        None => {
                            info!("All coordinator handles dropped. Shutting down.");
                            break;
                        }
                    }
                }

                evt = self.events_rx.recv() => {
                    match evt {
                        Some(e) => {
                            if let Err(err) = self.handle_negotiation_event(e).await {
                                self.report(err);
                            }
                        }
                        None => {
                            warn!("Negotiation event channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        self.registry.close_all().await;
        self.registry.observer().close();

        // Dropping the queue lets the writer drain what is left and stop.
        drop(self);
        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                error!("Outbound writer panicked: {:?}", e);
            }
        }

        info!("Coordinator event loop finished");
    }

    async fn handle_frame(&mut self, frame: Bytes) {
        let result = match decode(&frame) {
            Ok(message) => {
                debug!("Received {}", message.kind());
                self.dispatch(message).await
            }
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            self.report(e);
        }
    }

    async fn dispatch(&mut self, message: SignalMessage) -> Result<(), CoordinatorError> {
        match message {
            SignalMessage::Roster { ids, self_id } => self.handle_roster(ids, self_id).await,
            SignalMessage::Offer { offer, to, from } => self.handle_offer(offer, to, from).await,
            SignalMessage::Answer { answer, to, from } => {
                self.handle_answer(answer, to, from).await
            }
            SignalMessage::CandidateOffer {
                candidate,
                to,
                from,
            } => self.handle_candidate(candidate, to, from).await,
        }
    }

    async fn handle_roster(
        &mut self,
        ids: BTreeSet<ParticipantId>,
        self_id: ParticipantId,
    ) -> Result<(), CoordinatorError> {
        if let Some(existing) = self.self_id.get() {
            info!("Ignoring repeated roster, self id is already {}", existing);
            return Ok(());
        }
        let local = self.self_id.get_or_init(|| self_id).clone();
        info!("Assigned self id {}, {} other participants", local, ids.len());

        for remote_id in ids.iter().filter(|id| **id != local) {
            if let Err(e) = self.offer_to(&local, remote_id).await {
                self.report(e);
            }
        }
        Ok(())
    }

    async fn offer_to(
        &mut self,
        local: &ParticipantId,
        remote_id: &ParticipantId,
    ) -> Result<(), CoordinatorError> {
        let link = self.registry.create_if_absent(remote_id).await?;
        link.local_id.get_or_insert_with(|| local.clone());

        let previous = link.state();
        if previous != LinkState::Initiating {
            debug!("Link to {} already {}, not offering", remote_id, previous);
            return Ok(());
        }

        let result = NegotiationDriver::new(local).initiate_offer(link).await;
        self.registry.sync(remote_id, previous);
        self.outbound.send(result?);
        Ok(())
    }

    async fn handle_offer(
        &mut self,
        offer: SessionDescription,
        to: ParticipantId,
        from: ParticipantId,
    ) -> Result<(), CoordinatorError> {
        let local = self.local_for(&to, &from)?;
        let link = self.registry.create_if_absent(&from).await?;
        link.local_id.get_or_insert_with(|| local.clone());

        let previous = link.state();
        let driver = NegotiationDriver::new(&local);
        let result = match previous {
            LinkState::Initiating => driver.accept_offer(link, offer).await,
            LinkState::Failed => Err(CoordinatorError::InvalidStateTransition {
                remote_id: from.clone(),
                state: previous,
                operation: "accept_offer",
            }),
            _ => match driver.resolve_glare(link, offer).await {
                Ok(GlareOutcome::KeepLocalOffer) => {
                    info!("Glare with {}: ignoring remote offer", from);
                    Ok(Vec::new())
                }
                Ok(GlareOutcome::Answered(messages)) => {
                    info!("Glare with {}: answered remote offer", from);
                    Ok(messages)
                }
                Err(e) => Err(e),
            },
        };

        self.registry.sync(&from, previous);
        self.outbound.extend(result?);
        Ok(())
    }

    async fn handle_answer(
        &mut self,
        answer: SessionDescription,
        to: ParticipantId,
        from: ParticipantId,
    ) -> Result<(), CoordinatorError> {
        let local = self.local_for(&to, &from)?;
        let link = self.registry.get_mut(&from)?;

        let previous = link.state();
        let result = NegotiationDriver::new(&local)
            .accept_answer(link, answer)
            .await;

        self.registry.sync(&from, previous);
        self.outbound.extend(result?);
        Ok(())
    }

    async fn handle_candidate(
        &mut self,
        candidate: IceCandidate,
        to: ParticipantId,
        from: ParticipantId,
    ) -> Result<(), CoordinatorError> {
        let local = self.local_for(&to, &from)?;

        if self.registry.get_or_none(&from).is_none() {
            if self.registry.queue_orphan_candidate(&from, candidate) {
                debug!("Candidate from {} arrived before its link, queueing", from);
            } else {
                warn!("Too many early candidates, dropping one from {}", from);
            }
            return Ok(());
        }

        let link = self.registry.get_mut(&from)?;
        let outcome = NegotiationDriver::new(&local)
            .add_remote_candidate(link, candidate)
            .await?;
        debug!("Candidate from {}: {:?}", from, outcome);
        Ok(())
    }

    async fn handle_negotiation_event(
        &mut self,
        event: NegotiationEvent,
    ) -> Result<(), CoordinatorError> {
        let remote_id = event.remote_id().clone();
        let link = self.registry.get_mut(&remote_id)?;
        let previous = link.state();

        match event {
            NegotiationEvent::LocalCandidate(_, candidate) => {
                let local = self.self_id.get().or(link.local_id.as_ref()).cloned();
                let Some(local) = local else {
                    debug!("No local id for {} yet, dropping local candidate", remote_id);
                    return Ok(());
                };
                let driver = NegotiationDriver::new(&local);
                if let Some(message) = driver.local_candidate(link, candidate) {
                    self.outbound.send(message);
                }
            }

            NegotiationEvent::DataChannelOpen(_) => {
                info!("Data channel to {} open", remote_id);
                NegotiationDriver::data_channel_open(link);
            }

            NegotiationEvent::RemoteTrack(_, track) => {
                info!("Inbound {} track from {}", track.kind, remote_id);
                NegotiationDriver::remote_track(link, track);
            }

            NegotiationEvent::ConnectionLost(_) => {
                warn!("Connection to {} lost", remote_id);
                NegotiationDriver::connection_lost(link);
            }
        }

        self.registry.sync(&remote_id, previous);
        Ok(())
    }

    /// Local id to answer a directed message with.
    ///
    /// Until a roster assigns one, the message's own `to` is trusted.
    fn local_for(
        &self,
        to: &ParticipantId,
        from: &ParticipantId,
    ) -> Result<ParticipantId, CoordinatorError> {
        let misaddressed = || CoordinatorError::Misaddressed {
            to: to.clone(),
            from: from.clone(),
        };

        if to == from {
            return Err(misaddressed());
        }
        match self.self_id.get() {
            Some(local) if local != to => Err(misaddressed()),
            Some(local) => Ok(local.clone()),
            None => Ok(to.clone()),
        }
    }

    fn report(&self, err: CoordinatorError) {
        match err {
            CoordinatorError::NegotiationUnavailable { .. } => error!("{}", err),
            _ => warn!("Dropped message: {}", err),
        }
    }
}
