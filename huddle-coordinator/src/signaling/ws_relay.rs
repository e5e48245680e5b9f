use crate::coordinator::CoordinatorHandle;
use crate::signaling::RelayOutput;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Websocket connection to a `huddle-relay` group.
pub struct RelayConnection;

impl RelayConnection {
    /// Connects to `<base_url>/signaling/<group_id>`.
    ///
    /// Reconnecting after the socket drops is left to the caller.
    pub async fn connect(base_url: &str, group_id: &str) -> Result<(WsRelayOutput, RelayInbound)> {
        let url = format!("{}/signaling/{}", base_url.trim_end_matches('/'), group_id);
        info!("Connecting to relay at {url}");

        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .with_context(|| format!("could not open websocket to {url}"))?;
        let (tx, rx) = ws_stream.split();

        Ok((
            WsRelayOutput {
                sink: Mutex::new(tx),
            },
            RelayInbound { stream: rx },
        ))
    }
}

/// Sending half; implements [`RelayOutput`].
pub struct WsRelayOutput {
    sink: Mutex<SplitSink<WsStream, Message>>,
}

#[async_trait]
impl RelayOutput for WsRelayOutput {
    async fn publish(&self, frame: Bytes) -> Result<()> {
        let text = String::from_utf8(frame.to_vec()).context("signal frame is not UTF-8")?;
        self.sink
            .lock()
            .await
            .send(Message::text(text))
            .await
            .context("failed to send frame to relay")
    }
}

/// Receiving half.
pub struct RelayInbound {
    stream: SplitStream<WsStream>,
}

impl RelayInbound {
    /// Feeds every relay frame into `handle` until the socket or the
    /// coordinator closes.
    pub async fn pump(mut self, handle: CoordinatorHandle) -> Result<()> {
        while let Some(message) = self.stream.next().await {
            let frame = match message.context("relay connection failed")? {
                Message::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
                Message::Binary(data) => data,
                Message::Close(reason) => {
                    info!("Relay closed the connection: {:?}", reason);
                    break;
                }
                other => {
                    debug!("Ignoring relay control frame {:?}", other);
                    continue;
                }
            };

            if handle.deliver(frame).await.is_err() {
                warn!("Coordinator stopped, no longer reading from relay");
                break;
            }
        }
        Ok(())
    }
}
