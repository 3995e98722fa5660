//! Wire `Call` — what providers POST to the manager.

use serde::{Deserialize, Serialize};

use crate::common::{Operation, OperationStatus, ProviderInfo, Resource};
use crate::json;

/// Discriminator for [`Call`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum CallType {
    /// Unrecognized call.
    Unknown = 0,
    /// Open (or re-open) a subscription.
    Subscribe = 1,
    /// Report progress of an offer operation.
    UpdateOfferOperationStatus = 2,
    /// Report the provider's full resource state.
    UpdateState = 3,
    /// Acknowledge a publish request.
    UpdatePublishResourcesStatus = 4,
}

impl CallType {
    /// Wire name of the call type.
    #[must_use]
    pub fn as_str_name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Subscribe => "SUBSCRIBE",
            Self::UpdateOfferOperationStatus => "UPDATE_OFFER_OPERATION_STATUS",
            Self::UpdateState => "UPDATE_STATE",
            Self::UpdatePublishResourcesStatus => "UPDATE_PUBLISH_RESOURCES_STATUS",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "UNKNOWN" => Some(Self::Unknown),
            "SUBSCRIBE" => Some(Self::Subscribe),
            "UPDATE_OFFER_OPERATION_STATUS" => Some(Self::UpdateOfferOperationStatus),
            "UPDATE_STATE" => Some(Self::UpdateState),
            "UPDATE_PUBLISH_RESOURCES_STATUS" => Some(Self::UpdatePublishResourcesStatus),
            _ => None,
        }
    }
}

json::enumeration_json! {
    /// JSON rendering of [`CallType`] fields.
    call_type,
    crate::call::CallType
}

/// Outcome of a publish request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PublishResourcesStatus {
    /// No outcome reported.
    Unknown = 0,
    /// The resources are active at the provider.
    Ok = 1,
    /// The provider could not make the resources active.
    Failed = 2,
}

impl PublishResourcesStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str_name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Ok => "OK",
            Self::Failed => "FAILED",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "UNKNOWN" => Some(Self::Unknown),
            "OK" => Some(Self::Ok),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

json::enumeration_json! {
    /// JSON rendering of [`PublishResourcesStatus`] fields.
    publish_resources_status,
    crate::call::PublishResourcesStatus
}

/// One inbound call.
///
/// Exactly one payload field matching `type` is expected to be set; the
/// translation boundary enforces this.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Call {
    /// Call discriminator.
    #[prost(enumeration = "CallType", tag = "1")]
    #[serde(with = "call_type")]
    pub r#type: i32,
    /// Subscription the call addresses; required for every type except
    /// `SUBSCRIBE`.
    #[prost(string, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_provider_id: Option<String>,
    /// `SUBSCRIBE` payload.
    #[prost(message, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<Subscribe>,
    /// `UPDATE_OFFER_OPERATION_STATUS` payload.
    #[prost(message, optional, tag = "4")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_offer_operation_status: Option<UpdateOfferOperationStatus>,
    /// `UPDATE_STATE` payload.
    #[prost(message, optional, tag = "5")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_state: Option<UpdateState>,
    /// `UPDATE_PUBLISH_RESOURCES_STATUS` payload.
    #[prost(message, optional, tag = "6")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_publish_resources_status: Option<UpdatePublishResourcesStatus>,
}

/// `SUBSCRIBE` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscribe {
    /// The subscriber's descriptor.
    #[prost(message, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_provider_info: Option<ProviderInfo>,
}

/// `UPDATE_OFFER_OPERATION_STATUS` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOfferOperationStatus {
    /// Framework that issued the operation, if any.
    #[prost(string, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_id: Option<String>,
    /// The status being reported.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
    /// Latest known status, when it differs from `status`.
    #[prost(message, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_status: Option<OperationStatus>,
    /// Operation UUID echoed from the apply event.
    #[prost(bytes = "vec", tag = "4")]
    #[serde(with = "json::base64_bytes")]
    pub operation_uuid: Vec<u8>,
}

/// `UPDATE_STATE` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateState {
    /// The provider's full resource set.
    #[prost(message, repeated, tag = "1")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    /// Resource version.
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub resource_version_uuid: Vec<u8>,
    /// Operations pending on the provider.
    #[prost(message, repeated, tag = "3")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<Operation>,
}

/// `UPDATE_PUBLISH_RESOURCES_STATUS` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePublishResourcesStatus {
    /// Publish UUID echoed from the publish event.
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::base64_bytes")]
    pub uuid: Vec<u8>,
    /// Reported outcome.
    #[prost(enumeration = "PublishResourcesStatus", tag = "2")]
    #[serde(with = "publish_resources_status")]
    pub status: i32,
}
