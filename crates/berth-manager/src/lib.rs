//! # berth-manager
//!
//! The resource provider manager: accepts long-lived streaming subscriptions
//! from external resource providers, routes typed requests to the right
//! provider, correlates asynchronous publish acknowledgements, and surfaces
//! provider-originated state changes to the host process as a FIFO queue.
//!
//! All protocol state lives on a single actor task; callers interact through
//! the [`ResourceProviderManager`] façade, which enqueues commands and hands
//! back completion futures. Per-session ordering follows from the actor:
//! events sent within one actor turn appear on the wire in call order.

#![deny(unsafe_code)]

mod actor;
pub mod connection;
pub mod error;
pub mod manager;
mod session;

pub use connection::ProviderConnection;
pub use error::{CallError, PublishError};
pub use manager::ResourceProviderManager;
