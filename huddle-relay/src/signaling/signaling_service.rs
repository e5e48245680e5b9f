use crate::group::{GroupManager, MemberSender};
use axum::extract::ws::Message;
use huddle_core::{IceServerConfig, ParticipantId, SignalMessage, decode, encode};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Why a member's frame was not forwarded.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Decode(#[from] huddle_core::DecodeError),

    #[error("members may not send {0} messages")]
    NotDirected(huddle_core::MessageKind),

    #[error("frame claims to be from {claimed}")]
    SpoofedSender { claimed: ParticipantId },

    #[error("no member {0} in this group")]
    UnknownRecipient(ParticipantId),

    #[error("member {0} disconnected")]
    RecipientGone(ParticipantId),
}

struct SignalingInner {
    groups: GroupManager,
    ice_servers: Vec<IceServerConfig>,
}

/// Routes signaling frames between members of the same group.
///
/// The relay never interprets offers or candidates; it only checks that a
/// frame is well formed and addressed to someone it knows.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                groups: GroupManager::new(),
                ice_servers,
            }),
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn groups(&self) -> &GroupManager {
        &self.inner.groups
    }

    /// Registers a member and sends it the roster of who was already there.
    pub fn join(&self, group_id: &str, tx: MemberSender) -> ParticipantId {
        let (self_id, ids) = self.inner.groups.join(group_id, tx.clone());
        debug!("{} joined group {} with {} others", self_id, group_id, ids.len());

        let roster = SignalMessage::Roster {
            ids,
            self_id: self_id.clone(),
        };
        let frame = String::from_utf8_lossy(&encode(&roster)).into_owned();
        if let Err(e) = tx.send(Message::Text(frame.into())) {
            error!("Failed to send roster to {}: {:?}", self_id, e);
        }

        self_id
    }

    pub fn leave(&self, group_id: &str, id: &ParticipantId) {
        self.inner.groups.leave(group_id, id);
    }

    /// Forwards `frame` unchanged to the member named in its `to` field.
    pub fn forward(
        &self,
        group_id: &str,
        sender: &ParticipantId,
        frame: &str,
    ) -> Result<(), RouteError> {
        let message = decode(frame.as_bytes())?;

        let (Some(from), Some(to)) = (message.sender(), message.recipient()) else {
            return Err(RouteError::NotDirected(message.kind()));
        };
        if from != sender {
            return Err(RouteError::SpoofedSender {
                claimed: from.clone(),
            });
        }

        let tx = self
            .inner
            .groups
            .sender(group_id, to)
            .ok_or_else(|| RouteError::UnknownRecipient(to.clone()))?;
        tx.send(Message::Text(frame.to_owned().into()))
            .map_err(|_| RouteError::RecipientGone(to.clone()))?;

        debug!("Routed {} from {} to {}", message.kind(), from, to);
        Ok(())
    }
}
