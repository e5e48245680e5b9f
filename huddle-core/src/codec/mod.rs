//! JSON wire codec for [`SignalMessage`].

mod decode_error;

pub use decode_error::DecodeError;

use crate::model::{MessageKind, SignalMessage};
use bytes::Bytes;
use serde_json::Value;

/// Decode one relay frame.
///
/// The `type` discriminant is resolved against [`MessageKind`] before the body
/// is looked at, so an unrecognized tag never falls through to a best-effort
/// parse.
pub fn decode(raw: &[u8]) -> Result<SignalMessage, DecodeError> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;

    let kind = match value.get("type") {
        Some(Value::String(tag)) => MessageKind::from_wire_tag(tag)
            .ok_or_else(|| DecodeError::UnknownMessageKind(Some(tag.clone())))?,
        Some(other) => return Err(DecodeError::UnknownMessageKind(Some(other.to_string()))),
        None => return Err(DecodeError::UnknownMessageKind(None)),
    };

    serde_json::from_value(value).map_err(|e| DecodeError::MalformedPayload(format!("{kind}: {e}")))
}

pub fn encode(message: &SignalMessage) -> Bytes {
    // Every field is a string, an optional string/integer or a set of
    // strings, none of which can fail to serialize.
    let json = serde_json::to_vec(message).expect("signal messages always serialize");
    Bytes::from(json)
}
