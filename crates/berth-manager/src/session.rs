//! Per-subscription session state.

use std::collections::HashMap;

use tokio::sync::oneshot;
use tracing::info;
use uuid::Uuid;

use berth_core::calls::ProviderInfo;
use berth_core::ids::ProviderId;

use crate::connection::ProviderConnection;
use crate::error::PublishError;

/// The live server-side state for one subscription instance.
///
/// Every entry in `pending_publishes` corresponds to a `PUBLISH_RESOURCES`
/// event actually written to the connection; each entry completes exactly
/// once, either through a matching status update or on teardown.
pub(crate) struct ProviderSession {
    /// Stable provider identity (survives resubscribes).
    pub provider_id: ProviderId,
    /// Latest received descriptor, with the ID filled in.
    pub info: ProviderInfo,
    /// The write half of the subscription stream.
    pub connection: ProviderConnection,
    /// Outstanding publish requests keyed by publish UUID.
    pub pending_publishes: HashMap<Uuid, oneshot::Sender<Result<(), PublishError>>>,
}

impl ProviderSession {
    pub fn new(provider_id: ProviderId, info: ProviderInfo, connection: ProviderConnection) -> Self {
        Self {
            provider_id,
            info,
            connection,
            pending_publishes: HashMap::new(),
        }
    }
}

impl Drop for ProviderSession {
    /// Session teardown: fail every pending publish with a connection-closed
    /// error. Dropping the connection's writer afterwards terminates the
    /// response stream. Replacement, disconnect, and manager shutdown all
    /// funnel through this one path.
    fn drop(&mut self) {
        info!(provider_id = %self.provider_id, "terminating resource provider session");
        for (_, pending) in self.pending_publishes.drain() {
            let _ = pending.send(Err(PublishError::ConnectionClosed(self.provider_id.clone())));
        }
    }
}
