//! Record-IO stream framing.
//!
//! After a successful subscribe, the response body is an unbounded sequence
//! of length-delimited records:
//!
//! ```text
//! +----------------------+------------------------+
//! | ASCII decimal length | '\n' | payload (length) |
//! +----------------------+------------------------+
//! ```
//!
//! The encoder is a free function (the write side frames one record at a
//! time); the decoder is a [`tokio_util::codec`] `Decoder` for client-side
//! stream consumption. The length header is validated before any allocation
//! and capped at [`MAX_RECORD_SIZE`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::Decoder;

/// Maximum accepted record payload size (16 MiB).
pub const MAX_RECORD_SIZE: usize = 16 * 1024 * 1024;

/// Longest accepted length header, in digits. `MAX_RECORD_SIZE` itself is
/// eight digits; anything longer is malformed.
const MAX_HEADER_DIGITS: usize = 19;

/// Frame one record.
#[must_use]
pub fn encode_record(payload: &[u8]) -> Bytes {
    let header = payload.len().to_string();
    let mut buf = BytesMut::with_capacity(header.len() + 1 + payload.len());
    buf.put_slice(header.as_bytes());
    buf.put_u8(b'\n');
    buf.put_slice(payload);
    buf.freeze()
}

/// Record framing failure.
#[derive(Debug, Error)]
pub enum RecordIoError {
    /// The length header is not a decimal number.
    #[error("invalid record length header")]
    InvalidHeader,
    /// The record exceeds [`MAX_RECORD_SIZE`].
    #[error("record of {size} bytes exceeds maximum {max}")]
    TooLarge {
        /// Declared payload size.
        size: usize,
        /// The configured cap.
        max: usize,
    },
    /// Underlying transport failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Streaming decoder for record-IO framed bytes.
#[derive(Debug, Default)]
pub struct RecordIoDecoder;

impl RecordIoDecoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for RecordIoDecoder {
    type Item = Bytes;
    type Error = RecordIoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, RecordIoError> {
        let newline = src.iter().position(|&b| b == b'\n');

        let Some(newline) = newline else {
            // No header terminator yet; a well-formed header cannot be this
            // long, so bail instead of buffering forever.
            if src.len() > MAX_HEADER_DIGITS {
                return Err(RecordIoError::InvalidHeader);
            }
            return Ok(None);
        };

        if newline == 0 || newline > MAX_HEADER_DIGITS {
            return Err(RecordIoError::InvalidHeader);
        }

        let header = &src[..newline];
        if !header.iter().all(u8::is_ascii_digit) {
            return Err(RecordIoError::InvalidHeader);
        }
        let length: usize = std::str::from_utf8(header)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(RecordIoError::InvalidHeader)?;

        // Validate before reserving anything.
        if length > MAX_RECORD_SIZE {
            return Err(RecordIoError::TooLarge {
                size: length,
                max: MAX_RECORD_SIZE,
            });
        }

        let total = newline + 1 + length;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(newline + 1);
        Ok(Some(src.split_to(length).freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_wire_format() {
        let record = encode_record(b"hello world");
        assert_eq!(&record[..], b"11\nhello world");
    }

    #[test]
    fn encode_empty_record() {
        let record = encode_record(b"");
        assert_eq!(&record[..], b"0\n");
    }

    #[test]
    fn decode_roundtrip() {
        let mut decoder = RecordIoDecoder::new();
        let mut buf = BytesMut::from(&encode_record(b"payload")[..]);
        let decoded = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&decoded[..], b"payload");
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_partial_header() {
        let mut decoder = RecordIoDecoder::new();
        let mut buf = BytesMut::from(&b"12"[..]);
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn decode_partial_payload() {
        let mut decoder = RecordIoDecoder::new();
        let mut buf = BytesMut::from(&b"10\nhalf"[..]);
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 7);
    }

    #[test]
    fn decode_multiple_records() {
        let mut decoder = RecordIoDecoder::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode_record(b"first"));
        buf.extend_from_slice(&encode_record(b"second"));

        let first = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first[..], b"first");
        let second = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&second[..], b"second");
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_empty_record() {
        let mut decoder = RecordIoDecoder::new();
        let mut buf = BytesMut::from(&b"0\n5\nhello"[..]);
        let empty = decoder.decode(&mut buf).unwrap().unwrap();
        assert!(empty.is_empty());
        let next = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&next[..], b"hello");
    }

    #[test]
    fn decode_rejects_non_decimal_header() {
        let mut decoder = RecordIoDecoder::new();
        let mut buf = BytesMut::from(&b"1x\ndata"[..]);
        assert!(matches!(
            decoder.decode(&mut buf),
            Err(RecordIoError::InvalidHeader)
        ));
    }

    #[test]
    fn decode_rejects_missing_header() {
        let mut decoder = RecordIoDecoder::new();
        let mut buf = BytesMut::from(&b"\ndata"[..]);
        assert!(matches!(
            decoder.decode(&mut buf),
            Err(RecordIoError::InvalidHeader)
        ));
    }

    #[test]
    fn decode_rejects_oversized_record() {
        let mut decoder = RecordIoDecoder::new();
        let declared = MAX_RECORD_SIZE + 1;
        let mut buf = BytesMut::from(format!("{declared}\n").as_bytes());
        assert!(matches!(
            decoder.decode(&mut buf),
            Err(RecordIoError::TooLarge { size, .. }) if size == declared
        ));
    }

    #[test]
    fn decode_rejects_runaway_header() {
        let mut decoder = RecordIoDecoder::new();
        let mut buf = BytesMut::from(&b"99999999999999999999999999"[..]);
        assert!(matches!(
            decoder.decode(&mut buf),
            Err(RecordIoError::InvalidHeader)
        ));
    }
}
