//! Wire messages shared between calls and events.

use serde::{Deserialize, Serialize};

use crate::json;

/// Static descriptor of a resource provider.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderInfo {
    /// Provider type, e.g. `org.apache.storage`.
    #[prost(string, tag = "1")]
    pub r#type: String,
    /// Provider name, unique within a type.
    #[prost(string, tag = "2")]
    pub name: String,
    /// Manager-assigned provider ID; absent on a first subscribe.
    #[prost(string, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// One elastic resource.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    /// Owning resource provider, if any.
    #[prost(string, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// Resource name.
    #[prost(string, tag = "2")]
    pub name: String,
    /// Scalar quantity.
    #[prost(double, tag = "3")]
    pub value: f64,
}

/// Description of one offer operation.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationInfo {
    /// Operation identifier assigned by the framework.
    #[prost(string, tag = "1")]
    pub id: String,
    /// Resources the operation acts on.
    #[prost(message, repeated, tag = "2")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

/// Lifecycle state of an offer operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OperationState {
    /// State not reported.
    Unknown = 0,
    /// Accepted but not yet applied.
    Pending = 1,
    /// Applied successfully.
    Finished = 2,
    /// Failed to apply.
    Failed = 3,
    /// Unrecoverable provider-side error.
    Error = 4,
    /// Dropped before reaching the provider.
    Dropped = 5,
}

impl OperationState {
    /// Wire name of the state.
    #[must_use]
    pub fn as_str_name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Pending => "PENDING",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
            Self::Dropped => "DROPPED",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "UNKNOWN" => Some(Self::Unknown),
            "PENDING" => Some(Self::Pending),
            "FINISHED" => Some(Self::Finished),
            "FAILED" => Some(Self::Failed),
            "ERROR" => Some(Self::Error),
            "DROPPED" => Some(Self::Dropped),
            _ => None,
        }
    }
}

json::enumeration_json! {
    /// JSON rendering of [`OperationState`] fields.
    operation_state,
    crate::common::OperationState
}

/// One status report for an offer operation.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationStatus {
    /// Reported state.
    #[prost(enumeration = "OperationState", tag = "1")]
    #[serde(with = "operation_state")]
    pub state: i32,
    /// Optional human-readable detail.
    #[prost(string, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Status UUID, used for acknowledgement.
    #[prost(bytes = "vec", optional, tag = "3")]
    #[serde(with = "json::base64_bytes_opt", skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Vec<u8>>,
}

/// An offer operation as carried in `UPDATE_STATE`.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Operation {
    /// Originating framework, if known.
    #[prost(string, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_id: Option<String>,
    /// The operation description.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<OperationInfo>,
    /// Most recent status, if any.
    #[prost(message, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_status: Option<OperationStatus>,
    /// Operation UUID.
    #[prost(bytes = "vec", tag = "4")]
    #[serde(with = "json::base64_bytes")]
    pub operation_uuid: Vec<u8>,
}
