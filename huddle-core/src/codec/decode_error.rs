use thiserror::Error;

/// Why an inbound frame could not be turned into a [`crate::SignalMessage`].
///
/// Neither case is fatal: callers log and drop the frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed signaling payload: {0}")]
    MalformedPayload(String),

    #[error("unknown signaling message kind: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnknownMessageKind(Option<String>),
}
