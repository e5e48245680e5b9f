use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Outbound side of the signaling relay.
///
/// Frames are handed over in the order they must reach the relay.
#[async_trait]
pub trait RelayOutput: Send + Sync {
    async fn publish(&self, frame: Bytes) -> Result<()>;
}
