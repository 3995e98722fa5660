//! Internal inbound call model.
//!
//! These are the types the manager's handlers consume. The HTTP layer parses
//! the external wire schema and translates into this model; the translation
//! boundary guarantees structural validity (typed payload present,
//! non-subscribe calls carry a provider ID), so handlers only deal with
//! semantic failures.
//!
//! UUID fields that originate on the provider side stay as raw bytes here:
//! each handler applies its own malformed-UUID policy (fatal for state
//! updates, log-and-drop for publish status reports).

use serde::{Deserialize, Serialize};

use crate::ids::{FrameworkId, ProviderId};
use crate::operations::{Operation, OperationStatus};
use crate::resources::Resource;

/// Static descriptor of a resource provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider type, e.g. `org.apache.storage`.
    pub kind: String,
    /// Provider name, unique within a type.
    pub name: String,
    /// Manager-assigned ID; absent on a first subscribe.
    pub id: Option<ProviderId>,
}

/// A `SUBSCRIBE` call payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subscribe {
    /// The subscriber's descriptor.
    pub info: ProviderInfo,
}

/// An inbound call, post-translation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Call {
    /// Open (or re-open) a subscription.
    Subscribe(Subscribe),
    /// Any call bound to an existing subscription.
    Provider {
        /// The subscription the call addresses.
        resource_provider_id: ProviderId,
        /// The typed payload.
        call: ProviderCall,
    },
}

/// A call addressed to an existing subscription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProviderCall {
    /// Call type not understood by this manager.
    Unknown,
    /// Provider reports progress of an offer operation.
    UpdateOfferOperationStatus(UpdateOfferOperationStatus),
    /// Provider reports its full resource state.
    UpdateState(UpdateState),
    /// Provider acknowledges a publish request.
    UpdatePublishResourcesStatus(UpdatePublishResourcesStatus),
}

impl ProviderCall {
    /// Call type name, for logging.
    #[must_use]
    pub fn call_type(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::UpdateOfferOperationStatus(_) => "UPDATE_OFFER_OPERATION_STATUS",
            Self::UpdateState(_) => "UPDATE_STATE",
            Self::UpdatePublishResourcesStatus(_) => "UPDATE_PUBLISH_RESOURCES_STATUS",
        }
    }
}

/// Payload of `UPDATE_OFFER_OPERATION_STATUS`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateOfferOperationStatus {
    /// Framework that issued the operation, if any.
    pub framework_id: Option<FrameworkId>,
    /// The status being reported.
    pub status: OperationStatus,
    /// Latest known status, when it differs from `status`.
    pub latest_status: Option<OperationStatus>,
    /// Operation UUID (raw bytes, echoed from the apply event).
    pub operation_uuid: Vec<u8>,
}

/// Payload of `UPDATE_STATE`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateState {
    /// The provider's full resource set.
    pub resources: Vec<Resource>,
    /// Resource version (raw 128-bit bytes).
    pub resource_version_uuid: Vec<u8>,
    /// Operations pending on the provider.
    pub operations: Vec<Operation>,
}

/// Outcome of a publish request, as reported by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishResourcesStatus {
    /// No outcome reported.
    Unknown,
    /// The resources are active at the provider.
    Ok,
    /// The provider could not make the resources active.
    Failed,
}

impl PublishResourcesStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Ok => "OK",
            Self::Failed => "FAILED",
        }
    }
}

/// Payload of `UPDATE_PUBLISH_RESOURCES_STATUS`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdatePublishResourcesStatus {
    /// Publish UUID (raw bytes, echoed from the publish event).
    pub uuid: Vec<u8>,
    /// Reported outcome.
    pub status: PublishResourcesStatus,
}
