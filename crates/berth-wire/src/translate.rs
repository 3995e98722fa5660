//! The translation boundary between the wire schema and the internal model.
//!
//! All HTTP parsing produces wire types; everything past this boundary is
//! the internal model from `berth-core`. Structural validation (typed
//! payload present, provider ID on non-subscribe calls, non-empty
//! descriptor fields) is folded into [`internalize`] so a call that crosses
//! the boundary is structurally sound. Semantic checks (is the provider
//! subscribed, do the UUID bytes parse) remain with the manager's handlers.

use thiserror::Error;

use berth_core::calls::{
    Call, ProviderCall, ProviderInfo, PublishResourcesStatus, Subscribe,
    UpdateOfferOperationStatus, UpdatePublishResourcesStatus, UpdateState,
};
use berth_core::events::Event;
use berth_core::ids::{FrameworkId, ProviderId};
use berth_core::operations::{Operation, OperationInfo, OperationState, OperationStatus};
use berth_core::resources::Resource;

use crate::call as wire_call;
use crate::call::CallType;
use crate::common as wire_common;
use crate::event as wire_event;
use crate::event::EventType;

/// Structural validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing.
    #[error("expecting '{0}' to be present")]
    MissingField(&'static str),
    /// A required field is present but empty.
    #[error("expecting '{0}' to be non-empty")]
    EmptyField(&'static str),
}

/// Translate a wire call into the internal model, validating structure.
pub fn internalize(call: wire_call::Call) -> Result<Call, ValidationError> {
    // Unrecognized numeric values stay dispatchable as UNKNOWN so a newer
    // client gets 501 rather than 400.
    let call_type = CallType::try_from(call.r#type).unwrap_or(CallType::Unknown);

    if call_type == CallType::Subscribe {
        let subscribe = call
            .subscribe
            .ok_or(ValidationError::MissingField("subscribe"))?;
        let info = subscribe
            .resource_provider_info
            .ok_or(ValidationError::MissingField("subscribe.resource_provider_info"))?;
        return Ok(Call::Subscribe(Subscribe {
            info: internalize_provider_info(info)?,
        }));
    }

    let resource_provider_id = match call.resource_provider_id {
        Some(id) if !id.is_empty() => ProviderId::from_string(id),
        Some(_) => return Err(ValidationError::EmptyField("resource_provider_id")),
        None => return Err(ValidationError::MissingField("resource_provider_id")),
    };

    let provider_call = match call_type {
        CallType::Unknown => ProviderCall::Unknown,
        CallType::UpdateOfferOperationStatus => {
            let update = call
                .update_offer_operation_status
                .ok_or(ValidationError::MissingField("update_offer_operation_status"))?;
            let status = update.status.ok_or(ValidationError::MissingField(
                "update_offer_operation_status.status",
            ))?;
            if update.operation_uuid.is_empty() {
                return Err(ValidationError::EmptyField(
                    "update_offer_operation_status.operation_uuid",
                ));
            }
            ProviderCall::UpdateOfferOperationStatus(UpdateOfferOperationStatus {
                framework_id: update.framework_id.map(FrameworkId::from_string),
                status: internalize_status(status),
                latest_status: update.latest_status.map(internalize_status),
                operation_uuid: update.operation_uuid,
            })
        }
        CallType::UpdateState => {
            let update = call
                .update_state
                .ok_or(ValidationError::MissingField("update_state"))?;
            if update.resource_version_uuid.is_empty() {
                return Err(ValidationError::EmptyField("update_state.resource_version_uuid"));
            }
            ProviderCall::UpdateState(UpdateState {
                resources: update.resources.into_iter().map(internalize_resource).collect(),
                resource_version_uuid: update.resource_version_uuid,
                operations: update
                    .operations
                    .into_iter()
                    .map(internalize_operation)
                    .collect::<Result<_, _>>()?,
            })
        }
        CallType::UpdatePublishResourcesStatus => {
            let update = call.update_publish_resources_status.ok_or(
                ValidationError::MissingField("update_publish_resources_status"),
            )?;
            if update.uuid.is_empty() {
                return Err(ValidationError::EmptyField(
                    "update_publish_resources_status.uuid",
                ));
            }
            let status = wire_call::PublishResourcesStatus::try_from(update.status)
                .unwrap_or(wire_call::PublishResourcesStatus::Unknown);
            ProviderCall::UpdatePublishResourcesStatus(UpdatePublishResourcesStatus {
                uuid: update.uuid,
                status: match status {
                    wire_call::PublishResourcesStatus::Unknown => PublishResourcesStatus::Unknown,
                    wire_call::PublishResourcesStatus::Ok => PublishResourcesStatus::Ok,
                    wire_call::PublishResourcesStatus::Failed => PublishResourcesStatus::Failed,
                },
            })
        }
        CallType::Subscribe => unreachable!("subscribe handled above"),
    };

    Ok(Call::Provider {
        resource_provider_id,
        call: provider_call,
    })
}

fn internalize_provider_info(
    info: wire_common::ProviderInfo,
) -> Result<ProviderInfo, ValidationError> {
    if info.r#type.is_empty() {
        return Err(ValidationError::EmptyField("resource_provider_info.type"));
    }
    if info.name.is_empty() {
        return Err(ValidationError::EmptyField("resource_provider_info.name"));
    }
    let id = match info.id {
        Some(id) if !id.is_empty() => Some(ProviderId::from_string(id)),
        Some(_) => return Err(ValidationError::EmptyField("resource_provider_info.id")),
        None => None,
    };
    Ok(ProviderInfo {
        kind: info.r#type,
        name: info.name,
        id,
    })
}

fn internalize_resource(resource: wire_common::Resource) -> Resource {
    Resource {
        provider_id: resource
            .provider_id
            .filter(|id| !id.is_empty())
            .map(ProviderId::from_string),
        name: resource.name,
        value: resource.value,
    }
}

fn internalize_status(status: wire_common::OperationStatus) -> OperationStatus {
    let state = wire_common::OperationState::try_from(status.state)
        .unwrap_or(wire_common::OperationState::Unknown);
    OperationStatus {
        state: match state {
            wire_common::OperationState::Unknown => OperationState::Unknown,
            wire_common::OperationState::Pending => OperationState::Pending,
            wire_common::OperationState::Finished => OperationState::Finished,
            wire_common::OperationState::Failed => OperationState::Failed,
            wire_common::OperationState::Error => OperationState::Error,
            wire_common::OperationState::Dropped => OperationState::Dropped,
        },
        message: status.message,
        uuid: status.uuid,
    }
}

fn internalize_operation(
    operation: wire_common::Operation,
) -> Result<Operation, ValidationError> {
    let info = operation
        .info
        .ok_or(ValidationError::MissingField("operation.info"))?;
    if operation.operation_uuid.is_empty() {
        return Err(ValidationError::EmptyField("operation.operation_uuid"));
    }
    Ok(Operation {
        framework_id: operation.framework_id.map(FrameworkId::from_string),
        info: OperationInfo {
            id: info.id,
            resources: info.resources.into_iter().map(internalize_resource).collect(),
        },
        latest_status: operation.latest_status.map(internalize_status),
        operation_uuid: operation.operation_uuid,
    })
}

/// Translate an internal event into the wire schema.
#[must_use]
pub fn externalize(event: &Event) -> wire_event::Event {
    match event {
        Event::Subscribed { provider_id } => wire_event::Event {
            r#type: EventType::Subscribed as i32,
            subscribed: Some(wire_event::Subscribed {
                provider_id: Some(provider_id.to_string()),
            }),
            ..Default::default()
        },
        Event::ApplyOfferOperation {
            framework_id,
            info,
            operation_uuid,
            resource_version_uuid,
        } => wire_event::Event {
            r#type: EventType::ApplyOfferOperation as i32,
            apply_offer_operation: Some(wire_event::ApplyOfferOperation {
                framework_id: Some(framework_id.to_string()),
                info: Some(externalize_operation_info(info)),
                operation_uuid: operation_uuid.clone(),
                resource_version_uuid: resource_version_uuid.clone(),
            }),
            ..Default::default()
        },
        Event::AcknowledgeOfferOperation {
            status_uuid,
            operation_uuid,
        } => wire_event::Event {
            r#type: EventType::AcknowledgeOfferOperation as i32,
            acknowledge_offer_operation: Some(wire_event::AcknowledgeOfferOperation {
                status_uuid: status_uuid.clone(),
                operation_uuid: operation_uuid.clone(),
            }),
            ..Default::default()
        },
        Event::ReconcileOfferOperations { operation_uuids } => wire_event::Event {
            r#type: EventType::ReconcileOfferOperations as i32,
            reconcile_offer_operations: Some(wire_event::ReconcileOfferOperations {
                operation_uuids: operation_uuids.clone(),
            }),
            ..Default::default()
        },
        Event::PublishResources { uuid, resources } => wire_event::Event {
            r#type: EventType::PublishResources as i32,
            publish_resources: Some(wire_event::PublishResources {
                uuid: uuid.as_bytes().to_vec(),
                resources: resources.iter().map(externalize_resource).collect(),
            }),
            ..Default::default()
        },
    }
}

fn externalize_resource(resource: &Resource) -> wire_common::Resource {
    wire_common::Resource {
        provider_id: resource.provider_id.as_ref().map(ToString::to_string),
        name: resource.name.clone(),
        value: resource.value,
    }
}

fn externalize_operation_info(info: &OperationInfo) -> wire_common::OperationInfo {
    wire_common::OperationInfo {
        id: info.id.clone(),
        resources: info.resources.iter().map(externalize_resource).collect(),
    }
}
