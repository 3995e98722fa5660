//! Protobuf-JSON serde helpers.
//!
//! The JSON rendering of the wire schema follows protobuf-JSON conventions:
//! enumeration fields carry their SCREAMING_SNAKE_CASE names (numeric values
//! are accepted on input) and `bytes` fields are base64 strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

/// Generates a serde `with`-module for an `i32` field backed by a
/// `prost::Enumeration`. Unknown numeric values pass through untouched so
/// decoding stays forward-compatible.
macro_rules! enumeration_json {
    ($(#[$meta:meta])* $name:ident, $enum:ty) => {
        $(#[$meta])*
        pub(crate) mod $name {
            use serde::de::{self, Visitor};
            use serde::{Deserializer, Serializer};
            use std::fmt;

            pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
                match <$enum>::try_from(*value) {
                    Ok(v) => serializer.serialize_str(v.as_str_name()),
                    Err(_) => serializer.serialize_i32(*value),
                }
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
                struct EnumVisitor;

                impl Visitor<'_> for EnumVisitor {
                    type Value = i32;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "an enum name or numeric value")
                    }

                    fn visit_str<E: de::Error>(self, v: &str) -> Result<i32, E> {
                        <$enum>::from_str_name(v)
                            .map(|e| e as i32)
                            .ok_or_else(|| E::custom(format!("unknown enum value '{v}'")))
                    }

                    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
                        i32::try_from(v).map_err(E::custom)
                    }

                    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
                        i32::try_from(v).map_err(E::custom)
                    }
                }

                deserializer.deserialize_any(EnumVisitor)
            }
        }
    };
}

pub(crate) use enumeration_json;

/// Serde `with`-module for a required `bytes` field.
pub(crate) mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        struct BytesVisitor;

        impl Visitor<'_> for BytesVisitor {
            type Value = Vec<u8>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a base64 string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Vec<u8>, E> {
                STANDARD.decode(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(BytesVisitor)
    }
}

/// Serde `with`-module for an optional `bytes` field.
pub(crate) mod base64_bytes_opt {
    use super::*;
    use serde::Deserialize;

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        value
            .map(|s| STANDARD.decode(s).map_err(de::Error::custom))
            .transpose()
    }
}

/// Serde `with`-module for a repeated `bytes` field.
pub(crate) mod base64_bytes_repeated {
    use super::*;
    use serde::ser::SerializeSeq;
    use serde::Deserialize;

    pub fn serialize<S: Serializer>(
        value: &[Vec<u8>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for bytes in value {
            seq.serialize_element(&STANDARD.encode(bytes))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let values: Vec<String> = Vec::deserialize(deserializer)?;
        values
            .into_iter()
            .map(|s| STANDARD.decode(s).map_err(de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct BytesHolder {
        #[serde(with = "super::base64_bytes")]
        data: Vec<u8>,
        #[serde(with = "super::base64_bytes_opt")]
        maybe: Option<Vec<u8>>,
        #[serde(with = "super::base64_bytes_repeated")]
        many: Vec<Vec<u8>>,
    }

    #[test]
    fn bytes_roundtrip() {
        let holder = BytesHolder {
            data: vec![1, 2, 3],
            maybe: Some(vec![4, 5]),
            many: vec![vec![6], vec![7, 8]],
        };
        let json = serde_json::to_string(&holder).unwrap();
        let back: BytesHolder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, holder);
    }

    #[test]
    fn bytes_render_as_base64() {
        let holder = BytesHolder {
            data: b"hello".to_vec(),
            maybe: None,
            many: vec![],
        };
        let value: serde_json::Value =
            serde_json::to_value(&holder).unwrap();
        assert_eq!(value["data"], "aGVsbG8=");
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = serde_json::from_str::<BytesHolder>(r#"{"data": "%%%", "maybe": null, "many": []}"#);
        assert!(err.is_err());
    }
}
