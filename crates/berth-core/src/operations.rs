//! Offer operation payload types.
//!
//! An offer operation is a control-plane-initiated action on a provider's
//! resources (create/destroy/modify). The manager does not interpret the
//! payload beyond deriving the owning provider from the operation's
//! resources; the schemas themselves belong to the control plane.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{FrameworkId, ProviderId};
use crate::resources::Resource;

/// The control-plane description of one offer operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationInfo {
    /// Operation identifier assigned by the framework.
    pub id: String,
    /// Resources the operation acts on.
    pub resources: Vec<Resource>,
}

/// Lifecycle state of an offer operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    /// State not reported.
    Unknown,
    /// Accepted but not yet applied.
    Pending,
    /// Applied successfully.
    Finished,
    /// Failed to apply.
    Failed,
    /// An unrecoverable provider-side error occurred.
    Error,
    /// Dropped before reaching the provider.
    Dropped,
}

impl OperationState {
    /// Wire name of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Pending => "PENDING",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
            Self::Dropped => "DROPPED",
        }
    }
}

/// One status report for an offer operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    /// Reported state.
    pub state: OperationState,
    /// Optional human-readable detail.
    pub message: Option<String>,
    /// Status UUID (raw bytes), used for acknowledgement.
    pub uuid: Option<Vec<u8>>,
}

/// An offer operation as reported by a provider in `UPDATE_STATE`.
///
/// `operation_uuid` is kept as raw bytes: the manager parses it in the
/// handler so malformed values hit the handler's own failure policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Originating framework, if known.
    pub framework_id: Option<FrameworkId>,
    /// The operation description.
    pub info: OperationInfo,
    /// Most recent status, if any.
    pub latest_status: Option<OperationStatus>,
    /// Operation UUID assigned by the manager (raw 128-bit bytes).
    pub operation_uuid: Vec<u8>,
}

/// Failure to derive the owning provider from an operation payload.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The operation names no resources at all.
    #[error("operation '{0}' has no resources")]
    NoResources(String),
    /// The operation's resources name more than one provider.
    #[error("operation '{0}' spans multiple resource providers")]
    MixedProviders(String),
}

/// Derive the owning resource provider of an operation.
///
/// Returns `Ok(None)` when every resource is agent-default, `Ok(Some(id))`
/// when all provider-owned resources agree on one provider, and an error
/// for empty or mixed resource sets.
pub fn derive_provider_id(info: &OperationInfo) -> Result<Option<ProviderId>, OperationError> {
    if info.resources.is_empty() {
        return Err(OperationError::NoResources(info.id.clone()));
    }

    let mut derived: Option<&ProviderId> = None;
    let mut saw_agent_default = false;
    for resource in &info.resources {
        match &resource.provider_id {
            Some(id) => match derived {
                None => derived = Some(id),
                Some(seen) if id != seen => {
                    return Err(OperationError::MixedProviders(info.id.clone()));
                }
                Some(_) => {}
            },
            None => saw_agent_default = true,
        }
    }

    if saw_agent_default && derived.is_some() {
        return Err(OperationError::MixedProviders(info.id.clone()));
    }

    Ok(derived.cloned())
}
