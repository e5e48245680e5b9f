use crate::signaling::RelayOutput;
use huddle_core::{SignalMessage, encode};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// FIFO of messages waiting for the relay.
///
/// Sending never blocks, so the dispatch loop is not held up by a slow relay.
#[derive(Clone)]
pub(crate) struct OutboundQueue {
    tx: mpsc::UnboundedSender<SignalMessage>,
}

impl OutboundQueue {
    pub(crate) fn new() -> (Self, OutboundWriter) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, OutboundWriter { rx })
    }

    pub(crate) fn send(&self, message: SignalMessage) {
        if self.tx.send(message).is_err() {
            warn!("Outbound writer is gone, dropping message");
        }
    }

    pub(crate) fn extend(&self, messages: impl IntoIterator<Item = SignalMessage>) {
        for message in messages {
            self.send(message);
        }
    }
}

pub(crate) struct OutboundWriter {
    rx: mpsc::UnboundedReceiver<SignalMessage>,
}

impl OutboundWriter {
    /// Publishes queued messages in order until every queue handle is dropped.
    pub(crate) async fn run(mut self, relay: Arc<dyn RelayOutput>) {
        while let Some(message) = self.rx.recv().await {
            debug!(
                "Publishing {} to {:?}",
                message.kind(),
                message.recipient().map(|id| id.as_str())
            );
            if let Err(e) = relay.publish(encode(&message)).await {
                warn!("Failed to publish {}: {:#}", message.kind(), e);
            }
        }
    }
}
