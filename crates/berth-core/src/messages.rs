//! Host-facing messages and host-initiated inputs.
//!
//! [`ProviderMessage`] is what the manager surfaces to the host process on
//! the outbound FIFO queue. The `*Message`/`*Request` structs are the inputs
//! the host hands to the manager's façade operations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calls::ProviderInfo;
use crate::ids::{FrameworkId, ProviderId};
use crate::operations::{Operation, OperationInfo, OperationStatus};
use crate::resources::Resource;

/// A provider-originated state change surfaced to the host.
///
/// Produced in FIFO order per provider; inter-provider order is unspecified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProviderMessage {
    /// A provider reported progress of an offer operation.
    UpdateOfferOperationStatus(UpdateOfferOperationStatusMessage),
    /// A provider reported its full resource state.
    UpdateState(UpdateStateMessage),
}

impl ProviderMessage {
    /// Message type name, for logging.
    #[must_use]
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::UpdateOfferOperationStatus(_) => "UPDATE_OFFER_OPERATION_STATUS",
            Self::UpdateState(_) => "UPDATE_STATE",
        }
    }
}

/// Host-facing rendering of an operation status update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateOfferOperationStatusMessage {
    /// Framework that issued the operation, if any.
    pub framework_id: Option<FrameworkId>,
    /// The reported status.
    pub status: OperationStatus,
    /// Latest known status, when it differs from `status`.
    pub latest_status: Option<OperationStatus>,
    /// Operation UUID (raw bytes).
    pub operation_uuid: Vec<u8>,
}

/// Host-facing rendering of a provider state update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateStateMessage {
    /// The provider's descriptor at the time of the update.
    pub info: ProviderInfo,
    /// Parsed resource version.
    pub resource_version: Uuid,
    /// The provider's full resource set.
    pub resources: Vec<Resource>,
    /// Pending operations keyed by parsed operation UUID.
    pub operations: HashMap<Uuid, Operation>,
}

/// Host request: forward an offer operation to its provider.
///
/// `operation_uuid` stays as raw bytes; the manager parses it and drops the
/// message (with an error log) when it is malformed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplyOfferOperationMessage {
    /// Framework that issued the operation.
    pub framework_id: FrameworkId,
    /// The operation description.
    pub operation: OperationInfo,
    /// Operation UUID (raw bytes).
    pub operation_uuid: Vec<u8>,
    /// Resource version the operation was issued against.
    pub resource_version_uuid: ResourceVersionUuid,
}

/// A resource version scoped to the provider that minted it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceVersionUuid {
    /// Provider the version belongs to.
    pub provider_id: Option<ProviderId>,
    /// The version itself (raw 128-bit bytes).
    pub uuid: Vec<u8>,
}

/// Host request: acknowledge an operation status update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferOperationUpdateAcknowledgement {
    /// Provider that reported the status.
    pub resource_provider_id: ProviderId,
    /// UUID of the acknowledged status.
    pub status_uuid: Uuid,
    /// UUID of the operation.
    pub operation_uuid: Uuid,
}

/// Host request: ask providers to replay operation statuses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOfferOperationsRequest {
    /// The operations to reconcile.
    pub operations: Vec<ReconcileOperation>,
}

/// One operation in a reconcile request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOperation {
    /// Provider the operation belongs to; operations without one are
    /// ignored by the manager.
    pub resource_provider_id: Option<ProviderId>,
    /// UUID of the operation.
    pub operation_uuid: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_names() {
        let msg = ProviderMessage::UpdateOfferOperationStatus(UpdateOfferOperationStatusMessage {
            framework_id: None,
            status: OperationStatus {
                state: crate::operations::OperationState::Finished,
                message: None,
                uuid: None,
            },
            latest_status: None,
            operation_uuid: vec![1, 2, 3],
        });
        assert_eq!(msg.message_type(), "UPDATE_OFFER_OPERATION_STATUS");
    }

    #[test]
    fn update_state_message_holds_parsed_uuids() {
        let uuid = Uuid::new_v4();
        let mut operations = HashMap::new();
        let _ = operations.insert(
            uuid,
            Operation {
                framework_id: None,
                info: OperationInfo {
                    id: "op".into(),
                    resources: vec![],
                },
                latest_status: None,
                operation_uuid: uuid.as_bytes().to_vec(),
            },
        );

        let msg = UpdateStateMessage {
            info: ProviderInfo {
                kind: "org.example.rp".into(),
                name: "disk".into(),
                id: Some(ProviderId::from("p1")),
            },
            resource_version: Uuid::new_v4(),
            resources: vec![],
            operations,
        };
        assert!(msg.operations.contains_key(&uuid));
    }
}
