use crate::error::CoordinatorError;
use crate::registry::{LinkState, PeerLink};
use huddle_core::{IceCandidate, ParticipantId, SessionDescription, SignalMessage, TrackRef};
use std::mem;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    Applied,
    /// Held until the remote description is set.
    Queued,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlareOutcome {
    /// The local negotiation stands and the incoming offer is ignored.
    KeepLocalOffer,
    /// The local negotiation was discarded and the remote offer answered.
    Answered(Vec<SignalMessage>),
}

/// Runs offer/answer steps against one [`PeerLink`] on behalf of `local_id`.
///
/// Every operation that talks to the capability fails the link when the
/// capability errors. The returned messages must be sent in order.
pub struct NegotiationDriver<'a> {
    local_id: &'a ParticipantId,
}

impl<'a> NegotiationDriver<'a> {
    pub fn new(local_id: &'a ParticipantId) -> Self {
        Self { local_id }
    }

    pub fn local_id(&self) -> &ParticipantId {
        self.local_id
    }

    pub async fn initiate_offer(
        &self,
        link: &mut PeerLink,
    ) -> Result<SignalMessage, CoordinatorError> {
        link.expect_state(&[LinkState::Initiating], "initiate_offer")?;

        let offer = link.handle.create_local_offer().await;
        let offer = link.settle(offer)?;
        let applied = link.handle.set_local_description(offer.clone()).await;
        link.settle(applied)?;
        link.state = LinkState::OfferSent;

        Ok(SignalMessage::offer(
            offer,
            link.remote_id.clone(),
            self.local_id.clone(),
        ))
    }

    pub async fn accept_offer(
        &self,
        link: &mut PeerLink,
        offer: SessionDescription,
    ) -> Result<Vec<SignalMessage>, CoordinatorError> {
        link.expect_state(&[LinkState::Initiating], "accept_offer")?;

        let applied = link.handle.set_remote_description(offer).await;
        link.settle(applied)?;
        link.remote_description_set = true;
        link.state = LinkState::OfferReceived;
        self.flush_remote_candidates(link).await;

        let answer = link.handle.create_local_answer().await;
        let answer = link.settle(answer)?;
        let applied = link.handle.set_local_description(answer.clone()).await;
        link.settle(applied)?;
        link.state = LinkState::AnswerSent;

        let mut out = vec![SignalMessage::answer(
            answer,
            link.remote_id.clone(),
            self.local_id.clone(),
        )];
        out.extend(self.arm_forwarding(link));
        link.promote_if_ready();
        Ok(out)
    }

    pub async fn accept_answer(
        &self,
        link: &mut PeerLink,
        answer: SessionDescription,
    ) -> Result<Vec<SignalMessage>, CoordinatorError> {
        link.expect_state(&[LinkState::OfferSent], "accept_answer")?;

        let applied = link.handle.set_remote_description(answer).await;
        link.settle(applied)?;
        link.remote_description_set = true;
        self.flush_remote_candidates(link).await;
        link.state = LinkState::AnswerReceived;

        let out = self.arm_forwarding(link);
        link.promote_if_ready();
        Ok(out)
    }

    pub async fn add_remote_candidate(
        &self,
        link: &mut PeerLink,
        candidate: IceCandidate,
    ) -> Result<CandidateOutcome, CoordinatorError> {
        if link.state == LinkState::Failed {
            return Err(CoordinatorError::InvalidStateTransition {
                remote_id: link.remote_id.clone(),
                state: link.state,
                operation: "add_remote_candidate",
            });
        }

        if !link.remote_description_set {
            link.pending_remote.push(candidate);
            return Ok(CandidateOutcome::Queued);
        }

        link.handle
            .add_remote_candidate(candidate)
            .await
            .map_err(|e| CoordinatorError::CandidateRejected {
                remote_id: link.remote_id.clone(),
                reason: format!("{e:#}"),
            })?;
        Ok(CandidateOutcome::Applied)
    }

    /// An offer arrived for a link that already started negotiating.
    ///
    /// The participant with the lexically smaller id keeps its negotiation.
    /// The other one discards its own, rolling back a pending local offer,
    /// and answers the incoming offer.
    pub async fn resolve_glare(
        &self,
        link: &mut PeerLink,
        remote_offer: SessionDescription,
    ) -> Result<GlareOutcome, CoordinatorError> {
        link.expect_state(
            &[
                LinkState::OfferSent,
                LinkState::AnswerSent,
                LinkState::AnswerReceived,
                LinkState::Connected,
            ],
            "resolve_glare",
        )?;

        if self.local_id < &link.remote_id {
            debug!("Glare with {}: keeping local negotiation", link.remote_id);
            return Ok(GlareOutcome::KeepLocalOffer);
        }

        if link.state == LinkState::OfferSent {
            debug!("Glare with {}: rolling back local offer", link.remote_id);
            let rolled_back = link
                .handle
                .set_local_description(SessionDescription::rollback())
                .await;
            link.settle(rolled_back)?;
        } else {
            debug!("Offer from {} restarts a {} link", link.remote_id, link.state);
        }
        link.reset_negotiation();

        let answered = self.accept_offer(link, remote_offer).await?;
        Ok(GlareOutcome::Answered(answered))
    }

    /// Forwards a gathered local candidate, or buffers it until the answer
    /// exchange is done so it never overtakes the offer or answer.
    pub fn local_candidate(
        &self,
        link: &mut PeerLink,
        candidate: IceCandidate,
    ) -> Option<SignalMessage> {
        if link.state == LinkState::Failed {
            return None;
        }
        if !link.forwarding_armed {
            link.pending_local.push(candidate);
            return None;
        }
        Some(SignalMessage::candidate(
            candidate,
            link.remote_id.clone(),
            self.local_id.clone(),
        ))
    }

    pub fn data_channel_open(link: &mut PeerLink) {
        link.data_channel_established = true;
        link.promote_if_ready();
    }

    pub fn remote_track(link: &mut PeerLink, track: TrackRef) {
        link.inbound_track = Some(track);
    }

    pub fn connection_lost(link: &mut PeerLink) {
        link.mark_failed("connection lost".to_owned());
    }

    fn arm_forwarding(&self, link: &mut PeerLink) -> Vec<SignalMessage> {
        link.forwarding_armed = true;
        mem::take(&mut link.pending_local)
            .into_iter()
            .map(|candidate| {
                SignalMessage::candidate(candidate, link.remote_id.clone(), self.local_id.clone())
            })
            .collect()
    }

    async fn flush_remote_candidates(&self, link: &mut PeerLink) {
        for candidate in mem::take(&mut link.pending_remote) {
            if let Err(e) = link.handle.add_remote_candidate(candidate).await {
                warn!("Queued candidate for {} rejected: {:#}", link.remote_id, e);
            }
        }
    }
}
