//! # berth-wire
//!
//! The external ("v1") wire schema of the resource provider protocol and its
//! transport plumbing:
//!
//! - **Messages**: hand-written protobuf structs for `Call` and `Event` with
//!   a parallel protobuf-JSON rendering (`serde`)
//! - **Content types**: `application/x-protobuf` / `application/json`
//!   parsing and `Accept` negotiation
//! - **Codec**: encode/decode one message in either content type
//! - **Record-IO**: the `"<length>\n<payload>"` stream framing
//! - **Translation**: the single boundary between the wire schema and the
//!   internal model in `berth-core`
//!
//! Two parallel schemas exist on purpose: HTTP parsing produces wire types,
//! the manager only ever consumes internal types, and [`translate`] maps
//! between them in both directions.

#![deny(unsafe_code)]

pub mod call;
pub mod codec;
pub mod common;
pub mod content_type;
pub mod event;
mod json;
pub mod recordio;
pub mod translate;

pub use call::{Call, CallType};
pub use codec::{decode_call, decode_event, encode_call, encode_event, WireError};
pub use content_type::{negotiate_accept, ContentType, APPLICATION_JSON, APPLICATION_PROTOBUF};
pub use event::{Event, EventType};
pub use translate::{externalize, internalize, ValidationError};
