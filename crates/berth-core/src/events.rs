//! Internal outbound event model.
//!
//! Events are built by the manager in this internal form and translated to
//! the external wire schema just before serialization onto a subscription
//! stream.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{FrameworkId, ProviderId};
use crate::operations::OperationInfo;
use crate::resources::Resource;

/// An event sent to a subscribed provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// First frame on every new stream; carries the assigned provider ID.
    Subscribed {
        /// The manager-assigned provider ID.
        provider_id: ProviderId,
    },
    /// Ask the provider to apply an offer operation.
    ApplyOfferOperation {
        /// Framework that issued the operation.
        framework_id: FrameworkId,
        /// The operation description.
        info: OperationInfo,
        /// Operation UUID (raw bytes).
        operation_uuid: Vec<u8>,
        /// Resource version the operation was issued against (raw bytes).
        resource_version_uuid: Vec<u8>,
    },
    /// Acknowledge an operation status update.
    AcknowledgeOfferOperation {
        /// UUID of the acknowledged status (raw bytes).
        status_uuid: Vec<u8>,
        /// UUID of the operation (raw bytes).
        operation_uuid: Vec<u8>,
    },
    /// Ask the provider to replay status for the listed operations.
    ReconcileOfferOperations {
        /// Operation UUIDs to reconcile (raw bytes each).
        operation_uuids: Vec<Vec<u8>>,
    },
    /// Ask the provider to make a resource set active.
    PublishResources {
        /// Fresh publish UUID; the provider echoes it back in
        /// `UPDATE_PUBLISH_RESOURCES_STATUS`.
        uuid: Uuid,
        /// The resources to publish.
        resources: Vec<Resource>,
    },
}

impl Event {
    /// Event type name, for logging.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Subscribed { .. } => "SUBSCRIBED",
            Self::ApplyOfferOperation { .. } => "APPLY_OFFER_OPERATION",
            Self::AcknowledgeOfferOperation { .. } => "ACKNOWLEDGE_OFFER_OPERATION",
            Self::ReconcileOfferOperations { .. } => "RECONCILE_OFFER_OPERATIONS",
            Self::PublishResources { .. } => "PUBLISH_RESOURCES",
        }
    }
}
