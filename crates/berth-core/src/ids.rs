//! Branded ID newtypes for type safety.
//!
//! Provider and framework IDs are distinct newtype wrappers around `String`
//! so one can never be passed where the other is expected. Generated IDs are
//! random UUIDs (v4) rendered in canonical hyphenated form.
//!
//! [`StreamId`] wraps [`uuid::Uuid`] directly: it is minted per subscription
//! instance and compared against the `Mesos-Stream-Id` request header on
//! every non-subscribe call.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a new random UUID string (v4, canonical form).
fn new_v4() -> String {
    Uuid::new_v4().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v4, canonical string form).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v4())
            }

            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a resource provider.
    ///
    /// Assigned by the manager on first subscribe and immutable afterwards;
    /// a resubscribing provider presents its previously assigned ID.
    ProviderId
}

branded_id! {
    /// Unique identifier for a framework (control-plane tenant).
    FrameworkId
}

/// Per-subscription stream identifier.
///
/// A fresh `StreamId` is minted for every subscribe. Clients must echo it in
/// the `Mesos-Stream-Id` header of every subsequent call, which fences out
/// calls from a process that has since resubscribed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamId(Uuid);

impl StreamId {
    /// Mint a fresh random stream ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the canonical header form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
