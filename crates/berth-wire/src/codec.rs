//! Encode/decode one wire message in a negotiated content type.

use prost::Message as _;
use thiserror::Error;

use crate::call::Call;
use crate::content_type::ContentType;
use crate::event::Event;

/// Serialization failure at the wire boundary.
#[derive(Debug, Error)]
pub enum WireError {
    /// Binary protobuf decode failure.
    #[error("failed to parse protobuf: {0}")]
    Protobuf(#[from] prost::DecodeError),
    /// JSON parse or render failure.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one [`Call`] from a request body.
pub fn decode_call(content_type: ContentType, body: &[u8]) -> Result<Call, WireError> {
    match content_type {
        ContentType::Protobuf => Ok(Call::decode(body)?),
        ContentType::Json => Ok(serde_json::from_slice(body)?),
    }
}

/// Encode one [`Call`] for a request body.
pub fn encode_call(content_type: ContentType, call: &Call) -> Result<Vec<u8>, WireError> {
    match content_type {
        ContentType::Protobuf => Ok(call.encode_to_vec()),
        ContentType::Json => Ok(serde_json::to_vec(call)?),
    }
}

/// Encode one [`Event`] for a subscription stream record.
pub fn encode_event(content_type: ContentType, event: &Event) -> Result<Vec<u8>, WireError> {
    match content_type {
        ContentType::Protobuf => Ok(event.encode_to_vec()),
        ContentType::Json => Ok(serde_json::to_vec(event)?),
    }
}

/// Decode one [`Event`] from a subscription stream record.
pub fn decode_event(content_type: ContentType, record: &[u8]) -> Result<Event, WireError> {
    match content_type {
        ContentType::Protobuf => Ok(Event::decode(record)?),
        ContentType::Json => Ok(serde_json::from_slice(record)?),
    }
}
