use crate::model::participant::ParticipantId;
use crate::model::session::{IceCandidate, SessionDescription};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const DEFAULT_STUN_SERVERS: [&str; 2] = [
    "stun:stun.sipgate.net:3478",
    "stun:stun.l.google.com:19302",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn default_stun() -> Vec<Self> {
        vec![Self {
            urls: DEFAULT_STUN_SERVERS.iter().map(|s| s.to_string()).collect(),
            username: None,
            credential: None,
        }]
    }
}

/// Signaling messages exchanged through the relay.
///
/// The `type` tags and field names are the ones the browser client puts on
/// the wire, hence `UserIds` and `OfferIce`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SignalMessage {
    /// Sent by the relay to a member when it joins: everyone already present
    /// plus the id assigned to the newcomer.
    #[serde(rename = "UserIds")]
    Roster {
        ids: BTreeSet<ParticipantId>,
        self_id: ParticipantId,
    },
    Offer {
        offer: SessionDescription,
        to: ParticipantId,
        from: ParticipantId,
    },
    Answer {
        answer: SessionDescription,
        to: ParticipantId,
        from: ParticipantId,
    },
    #[serde(rename = "OfferIce")]
    CandidateOffer {
        candidate: IceCandidate,
        to: ParticipantId,
        from: ParticipantId,
    },
}

impl SignalMessage {
    pub fn offer(offer: SessionDescription, to: ParticipantId, from: ParticipantId) -> Self {
        Self::Offer { offer, to, from }
    }

    pub fn answer(answer: SessionDescription, to: ParticipantId, from: ParticipantId) -> Self {
        Self::Answer { answer, to, from }
    }

    pub fn candidate(candidate: IceCandidate, to: ParticipantId, from: ParticipantId) -> Self {
        Self::CandidateOffer {
            candidate,
            to,
            from,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Roster { .. } => MessageKind::Roster,
            Self::Offer { .. } => MessageKind::Offer,
            Self::Answer { .. } => MessageKind::Answer,
            Self::CandidateOffer { .. } => MessageKind::CandidateOffer,
        }
    }

    /// `from` of a directed message; rosters have no sender.
    pub fn sender(&self) -> Option<&ParticipantId> {
        match self {
            Self::Roster { .. } => None,
            Self::Offer { from, .. }
            | Self::Answer { from, .. }
            | Self::CandidateOffer { from, .. } => Some(from),
        }
    }

    pub fn recipient(&self) -> Option<&ParticipantId> {
        match self {
            Self::Roster { .. } => None,
            Self::Offer { to, .. } | Self::Answer { to, .. } | Self::CandidateOffer { to, .. } => {
                Some(to)
            }
        }
    }
}

/// Discriminant of [`SignalMessage`], keyed by its wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Roster,
    Offer,
    Answer,
    CandidateOffer,
}

impl MessageKind {
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Roster,
        MessageKind::Offer,
        MessageKind::Answer,
        MessageKind::CandidateOffer,
    ];

    pub fn wire_tag(self) -> &'static str {
        match self {
            Self::Roster => "UserIds",
            Self::Offer => "Offer",
            Self::Answer => "Answer",
            Self::CandidateOffer => "OfferIce",
        }
    }

    pub fn from_wire_tag(tag: &str) -> Option<Self> {
        match tag {
            "UserIds" => Some(Self::Roster),
            "Offer" => Some(Self::Offer),
            "Answer" => Some(Self::Answer),
            "OfferIce" => Some(Self::CandidateOffer),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Roster => "Roster",
            Self::Offer => "Offer",
            Self::Answer => "Answer",
            Self::CandidateOffer => "CandidateOffer",
        };
        f.write_str(name)
    }
}
