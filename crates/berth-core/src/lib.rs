//! # berth-core
//!
//! Foundation types for the berth resource provider manager.
//!
//! This crate provides the shared vocabulary the other berth crates depend on:
//!
//! - **Branded IDs**: `ProviderId`, `FrameworkId`, `StreamId` newtypes
//! - **Resources**: the `Resource` payload type and provider partitioning
//! - **Offer operations**: operation payloads, statuses, and provider derivation
//! - **Calls / events**: the internal protocol model consumed by the manager
//! - **Messages**: the host-facing message queue types and host-initiated inputs
//! - **Logging**: `tracing` subscriber initialization

#![deny(unsafe_code)]

pub mod calls;
pub mod events;
pub mod ids;
pub mod logging;
pub mod messages;
pub mod operations;
pub mod resources;

pub use calls::{Call, ProviderCall, ProviderInfo, Subscribe};
pub use events::Event;
pub use ids::{FrameworkId, ProviderId, StreamId};
pub use messages::ProviderMessage;
pub use operations::{Operation, OperationInfo, OperationState, OperationStatus};
pub use resources::Resource;
