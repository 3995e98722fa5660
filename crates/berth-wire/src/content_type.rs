//! Media types and `Accept` negotiation.

use std::fmt;

/// Binary protobuf media type.
pub const APPLICATION_PROTOBUF: &str = "application/x-protobuf";

/// Protobuf-JSON media type.
pub const APPLICATION_JSON: &str = "application/json";

/// Wire encoding negotiated for one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    /// `application/x-protobuf`.
    Protobuf,
    /// `application/json`.
    Json,
}

impl ContentType {
    /// Parse a `Content-Type` header value. Media type matching is
    /// case-insensitive; parameters (`; charset=...`) are ignored.
    #[must_use]
    pub fn from_media_type(value: &str) -> Option<Self> {
        let media_type = value.split(';').next().unwrap_or("").trim();
        if media_type.eq_ignore_ascii_case(APPLICATION_PROTOBUF) {
            Some(Self::Protobuf)
        } else if media_type.eq_ignore_ascii_case(APPLICATION_JSON) {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// The canonical media type string.
    #[must_use]
    pub fn as_media_type(self) -> &'static str {
        match self {
            Self::Protobuf => APPLICATION_PROTOBUF,
            Self::Json => APPLICATION_JSON,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_media_type())
    }
}

/// Negotiate the subscription stream encoding from an `Accept` header.
///
/// A missing or empty header means every media type is acceptable and
/// defaults to JSON. JSON is preferred over protobuf when both are
/// acceptable. Returns `None` when neither supported type is acceptable.
#[must_use]
pub fn negotiate_accept(accept: Option<&str>) -> Option<ContentType> {
    let Some(accept) = accept else {
        return Some(ContentType::Json);
    };
    if accept.trim().is_empty() {
        return Some(ContentType::Json);
    }

    let mut accepts_json = false;
    let mut accepts_protobuf = false;

    for entry in accept.split(',') {
        let media_type = entry.split(';').next().unwrap_or("").trim();
        if media_type == "*/*" || media_type.eq_ignore_ascii_case("application/*") {
            accepts_json = true;
            accepts_protobuf = true;
        } else if media_type.eq_ignore_ascii_case(APPLICATION_JSON) {
            accepts_json = true;
        } else if media_type.eq_ignore_ascii_case(APPLICATION_PROTOBUF) {
            accepts_protobuf = true;
        }
    }

    if accepts_json {
        Some(ContentType::Json)
    } else if accepts_protobuf {
        Some(ContentType::Protobuf)
    } else {
        None
    }
}
