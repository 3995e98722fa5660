//! # berth-server
//!
//! Axum HTTP surface for the resource provider manager:
//!
//! - One `POST` endpoint accepting protobuf or JSON `Call` bodies
//! - Streaming subscribe responses (record-IO framed `Event`s) with
//!   `Mesos-Stream-Id` stream binding
//! - Health endpoint reporting subscribed-provider count
//! - Graceful shutdown via `CancellationToken`
//!
//! The host process embeds [`BerthServer`] and keeps a handle on the
//! [`berth_manager::ResourceProviderManager`] for the control-plane-facing
//! operations (apply/acknowledge/reconcile/publish) and the outbound
//! message queue.

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::BerthServer;
pub use shutdown::ShutdownCoordinator;
