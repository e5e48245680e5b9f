use crate::negotiation::{NegotiationEvent, NegotiationFactory, NegotiationHandle};
use crate::transport::TransportConfig;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use huddle_core::{IceCandidate, ParticipantId, SdpKind, SessionDescription, TrackRef};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_remote::TrackRemote;

/// Builds one `RTCPeerConnection` per link from a shared `webrtc` API.
pub struct WebRtcNegotiatorFactory {
    api: API,
    config: TransportConfig,
}

impl WebRtcNegotiatorFactory {
    pub fn new(config: TransportConfig) -> Result<Self> {
        // Codecs are registered even for data-only links so inbound tracks
        // can be accepted.
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let mut registry = Registry::new();
        registry = register_default_interceptors(registry, &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self { api, config })
    }

    fn rtc_configuration(&self) -> RTCConfiguration {
        let ice_servers = self
            .config
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect();

        RTCConfiguration {
            ice_servers,
            ..Default::default()
        }
    }
}

#[async_trait]
impl NegotiationFactory for WebRtcNegotiatorFactory {
    async fn create(
        &self,
        remote_id: &ParticipantId,
        events: mpsc::Sender<NegotiationEvent>,
    ) -> Result<Box<dyn NegotiationHandle>> {
        let peer_connection = Arc::new(
            self.api
                .new_peer_connection(self.rtc_configuration())
                .await
                .context("failed to create peer connection")?,
        );

        // Connection state: a failed transport is reported, the link decides.
        let state_tx = events.clone();
        let uid_state = remote_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let uid = uid_state.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {}", uid, s);
                    if s == RTCPeerConnectionState::Failed {
                        let _ = tx.send(NegotiationEvent::ConnectionLost(uid)).await;
                    }
                })
            },
        ));

        // Trickle ICE: local candidates go back through the dispatch loop.
        let ice_tx = events.clone();
        let uid_ice = remote_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let uid = uid_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(NegotiationEvent::LocalCandidate(uid, from_rtc_candidate(init)))
                    .await;
            })
        }));

        // Remote data channel: whichever side opens first, one open channel
        // is enough for the link.
        let dc_tx = events.clone();
        let uid_dc = remote_id.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let uid = uid_dc.clone();

            Box::pin(async move {
                debug!("Remote data channel '{}' from {}", dc.label(), uid);
                notify_on_open(&dc, uid, tx);
            })
        }));

        let track_tx = events.clone();
        let uid_track = remote_id.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let uid = uid_track.clone();

                Box::pin(async move {
                    let track = TrackRef {
                        id: track.id(),
                        stream_id: track.stream_id(),
                        kind: track.kind().to_string(),
                    };
                    let _ = tx.send(NegotiationEvent::RemoteTrack(uid, track)).await;
                })
            },
        ));

        let init = RTCDataChannelInit {
            ordered: Some(self.config.ordered),
            ..Default::default()
        };
        let data_channel = peer_connection
            .create_data_channel(&self.config.data_channel_label, Some(init))
            .await
            .context("failed to create data channel")?;
        notify_on_open(&data_channel, remote_id.clone(), events);

        Ok(Box::new(WebRtcNegotiator {
            remote_id: remote_id.clone(),
            peer_connection,
            data_channel,
        }))
    }
}

fn notify_on_open(
    channel: &Arc<RTCDataChannel>,
    remote_id: ParticipantId,
    tx: mpsc::Sender<NegotiationEvent>,
) {
    channel.on_open(Box::new(move || {
        let tx = tx.clone();
        let uid = remote_id.clone();

        Box::pin(async move {
            info!("Data channel open for {}", uid);
            let _ = tx.send(NegotiationEvent::DataChannelOpen(uid)).await;
        })
    }));
}

/// [`NegotiationHandle`] over one `RTCPeerConnection`.
pub struct WebRtcNegotiator {
    remote_id: ParticipantId,
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: Arc<RTCDataChannel>,
}

impl WebRtcNegotiator {
    pub fn data_channel(&self) -> &Arc<RTCDataChannel> {
        &self.data_channel
    }

    /// `webrtc` wants the sdp being rolled back, not an empty body.
    async fn rollback_description(&self) -> Result<RTCSessionDescription> {
        let current = match self.peer_connection.pending_local_description().await {
            Some(pending) => pending,
            None => self
                .peer_connection
                .local_description()
                .await
                .context("nothing to roll back")?,
        };
        let rollback = serde_json::from_value(json!({ "type": "rollback", "sdp": current.sdp }))?;
        Ok(rollback)
    }
}

#[async_trait]
impl NegotiationHandle for WebRtcNegotiator {
    async fn create_local_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        from_rtc_description(offer)
    }

    async fn create_local_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc_description(answer)
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        let description = match description.kind {
            SdpKind::Rollback => self.rollback_description().await?,
            _ => to_rtc_description(description)?,
        };
        self.peer_connection.set_local_description(description).await?;
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(to_rtc_description(description)?)
            .await?;
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(to_rtc_candidate(candidate))
            .await
            .with_context(|| format!("candidate from {} rejected", self.remote_id))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn to_rtc_description(description: SessionDescription) -> Result<RTCSessionDescription> {
    let rtc = match description.kind {
        SdpKind::Offer => RTCSessionDescription::offer(description.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(description.sdp)?,
        SdpKind::Pranswer => RTCSessionDescription::pranswer(description.sdp)?,
        SdpKind::Rollback => {
            serde_json::from_value(json!({ "type": "rollback", "sdp": description.sdp }))?
        }
    };
    Ok(rtc)
}

fn from_rtc_description(description: RTCSessionDescription) -> Result<SessionDescription> {
    let kind = match description.sdp_type {
        RTCSdpType::Offer => SdpKind::Offer,
        RTCSdpType::Answer => SdpKind::Answer,
        RTCSdpType::Pranswer => SdpKind::Pranswer,
        RTCSdpType::Rollback => SdpKind::Rollback,
        RTCSdpType::Unspecified => bail!("session description has no type"),
    };
    Ok(SessionDescription {
        kind,
        sdp: description.sdp,
    })
}

fn to_rtc_candidate(candidate: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        username_fragment: candidate.username_fragment,
    }
}

fn from_rtc_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}
