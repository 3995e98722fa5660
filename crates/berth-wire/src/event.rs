//! Wire `Event` — what the manager streams to subscribed providers.

use serde::{Deserialize, Serialize};

use crate::common::{OperationInfo, Resource};
use crate::json;

/// Discriminator for [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum EventType {
    /// Unrecognized event.
    Unknown = 0,
    /// Subscription accepted; carries the assigned provider ID.
    Subscribed = 1,
    /// Apply an offer operation.
    ApplyOfferOperation = 2,
    /// Acknowledge an operation status update.
    AcknowledgeOfferOperation = 3,
    /// Replay status for the listed operations.
    ReconcileOfferOperations = 4,
    /// Make a resource set active.
    PublishResources = 5,
}

impl EventType {
    /// Wire name of the event type.
    #[must_use]
    pub fn as_str_name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Subscribed => "SUBSCRIBED",
            Self::ApplyOfferOperation => "APPLY_OFFER_OPERATION",
            Self::AcknowledgeOfferOperation => "ACKNOWLEDGE_OFFER_OPERATION",
            Self::ReconcileOfferOperations => "RECONCILE_OFFER_OPERATIONS",
            Self::PublishResources => "PUBLISH_RESOURCES",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "UNKNOWN" => Some(Self::Unknown),
            "SUBSCRIBED" => Some(Self::Subscribed),
            "APPLY_OFFER_OPERATION" => Some(Self::ApplyOfferOperation),
            "ACKNOWLEDGE_OFFER_OPERATION" => Some(Self::AcknowledgeOfferOperation),
            "RECONCILE_OFFER_OPERATIONS" => Some(Self::ReconcileOfferOperations),
            "PUBLISH_RESOURCES" => Some(Self::PublishResources),
            _ => None,
        }
    }
}

json::enumeration_json! {
    /// JSON rendering of [`EventType`] fields.
    event_type,
    crate::event::EventType
}

/// One outbound event.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Event discriminator.
    #[prost(enumeration = "EventType", tag = "1")]
    #[serde(with = "event_type")]
    pub r#type: i32,
    /// `SUBSCRIBED` payload.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<Subscribed>,
    /// `APPLY_OFFER_OPERATION` payload.
    #[prost(message, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_offer_operation: Option<ApplyOfferOperation>,
    /// `ACKNOWLEDGE_OFFER_OPERATION` payload.
    #[prost(message, optional, tag = "4")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledge_offer_operation: Option<AcknowledgeOfferOperation>,
    /// `RECONCILE_OFFER_OPERATIONS` payload.
    #[prost(message, optional, tag = "5")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconcile_offer_operations: Option<ReconcileOfferOperations>,
    /// `PUBLISH_RESOURCES` payload.
    #[prost(message, optional, tag = "6")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_resources: Option<PublishResources>,
}

/// `SUBSCRIBED` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscribed {
    /// The manager-assigned provider ID.
    #[prost(string, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// `APPLY_OFFER_OPERATION` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOfferOperation {
    /// Framework that issued the operation.
    #[prost(string, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_id: Option<String>,
    /// The operation description.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<OperationInfo>,
    /// Operation UUID; the provider echoes it in status updates.
    #[prost(bytes = "vec", tag = "3")]
    #[serde(with = "json::base64_bytes")]
    pub operation_uuid: Vec<u8>,
    /// Resource version the operation was issued against.
    #[prost(bytes = "vec", tag = "4")]
    #[serde(with = "json::base64_bytes")]
    pub resource_version_uuid: Vec<u8>,
}

/// `ACKNOWLEDGE_OFFER_OPERATION` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct AcknowledgeOfferOperation {
    /// UUID of the acknowledged status.
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::base64_bytes")]
    pub status_uuid: Vec<u8>,
    /// UUID of the operation.
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub operation_uuid: Vec<u8>,
}

/// `RECONCILE_OFFER_OPERATIONS` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOfferOperations {
    /// Operation UUIDs to reconcile.
    #[prost(bytes = "vec", repeated, tag = "1")]
    #[serde(with = "json::base64_bytes_repeated", skip_serializing_if = "Vec::is_empty")]
    pub operation_uuids: Vec<Vec<u8>>,
}

/// `PUBLISH_RESOURCES` payload.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishResources {
    /// Fresh publish UUID; the provider echoes it back in
    /// `UPDATE_PUBLISH_RESOURCES_STATUS`.
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::base64_bytes")]
    pub uuid: Vec<u8>,
    /// The resources to publish.
    #[prost(message, repeated, tag = "2")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}
