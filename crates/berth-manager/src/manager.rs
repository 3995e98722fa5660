//! The host-facing manager façade.

use futures::future::try_join_all;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use berth_core::calls::{ProviderCall, Subscribe};
use berth_core::ids::ProviderId;
use berth_core::messages::{
    ApplyOfferOperationMessage, OfferOperationUpdateAcknowledgement, ProviderMessage,
    ReconcileOfferOperationsRequest,
};
use berth_core::resources::Resource;

use crate::actor::{Command, ManagerActor};
use crate::connection::ProviderConnection;
use crate::error::{CallError, PublishError};

/// Mediator between the cluster control plane and dynamically registered
/// resource providers.
///
/// Owns nothing directly: all state lives on the actor task spawned by
/// [`new`](Self::new). Operations enqueue commands; dropping the last handle
/// shuts the actor down, closing every session writer and failing every
/// pending publish.
pub struct ResourceProviderManager {
    commands: mpsc::UnboundedSender<Command>,
    messages: Mutex<Option<mpsc::UnboundedReceiver<ProviderMessage>>>,
}

impl ResourceProviderManager {
    /// Create a manager and spawn its actor task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();

        let actor = ManagerActor::new(messages_tx, commands.downgrade());
        let _ = tokio::spawn(actor.run(command_rx));

        Self {
            commands,
            messages: Mutex::new(Some(messages_rx)),
        }
    }

    /// Register a new subscription.
    ///
    /// Fire-and-forget: the `SUBSCRIBED` event (or a silent abort, if the
    /// connection dies first) is observable only on the stream. Any prior
    /// session for the same provider is replaced.
    pub fn subscribe(&self, connection: ProviderConnection, subscribe: Subscribe) {
        if self
            .commands
            .send(Command::Subscribe {
                connection,
                subscribe,
            })
            .is_err()
        {
            warn!("dropping subscribe: manager is shutting down");
        }
    }

    /// Dispatch a non-subscribe call from a provider.
    ///
    /// `stream_id` is the raw `Mesos-Stream-Id` header value; it must match
    /// the provider's current session.
    pub async fn call(
        &self,
        resource_provider_id: ProviderId,
        stream_id: Option<String>,
        call: ProviderCall,
    ) -> Result<(), CallError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::ProviderCall {
                resource_provider_id,
                stream_id,
                call,
                reply,
            })
            .map_err(|_| CallError::ShuttingDown)?;
        response.await.map_err(|_| CallError::ShuttingDown)?
    }

    /// Forward an offer operation to its provider.
    ///
    /// Undeliverable operations (malformed UUID, unknown or unsubscribed
    /// provider) are logged and dropped; the host may race with a provider
    /// disconnect, so this is not an error surface.
    pub fn apply_offer_operation(&self, message: ApplyOfferOperationMessage) {
        let _ = self.commands.send(Command::ApplyOfferOperation { message });
    }

    /// Acknowledge an offer operation status update.
    pub fn acknowledge_offer_operation_update(
        &self,
        message: OfferOperationUpdateAcknowledgement,
    ) {
        let _ = self
            .commands
            .send(Command::AcknowledgeOfferOperationUpdate { message });
    }

    /// Ask providers to replay status for the given operations.
    pub fn reconcile_offer_operations(&self, message: ReconcileOfferOperationsRequest) {
        let _ = self
            .commands
            .send(Command::ReconcileOfferOperations { message });
    }

    /// Publish a resource set at its providers.
    ///
    /// The returned future completes successfully once every involved
    /// provider acknowledges with `OK`; it fails with the first error
    /// reported: a non-OK status, a lost session ("connection closed"), or
    /// an unsubscribed provider (which fails the call before anything is
    /// sent). Resources without a provider ID are skipped.
    pub async fn publish_resources(&self, resources: Vec<Resource>) -> Result<(), PublishError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::PublishResources { resources, reply })
            .map_err(|_| PublishError::ShuttingDown)?;
        let receivers = response.await.map_err(|_| PublishError::ShuttingDown)??;

        let completions = receivers.into_iter().map(|receiver| async move {
            match receiver.await {
                Ok(result) => result,
                Err(_) => Err(PublishError::ShuttingDown),
            }
        });
        try_join_all(completions).await.map(|_| ())
    }

    /// Take the outbound message queue.
    ///
    /// The queue is a FIFO of exactly the actor's enqueue order. It can be
    /// taken once; subsequent calls return `None`.
    pub fn take_messages(&self) -> Option<mpsc::UnboundedReceiver<ProviderMessage>> {
        self.messages.lock().take()
    }

    /// IDs of the currently subscribed providers.
    pub async fn subscribed_providers(&self) -> Vec<ProviderId> {
        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(Command::SubscribedProviders { reply })
            .is_err()
        {
            return Vec::new();
        }
        response.await.unwrap_or_default()
    }

    /// Number of pending publishes for one provider (0 if not subscribed).
    pub async fn pending_publishes(&self, provider_id: ProviderId) -> usize {
        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(Command::PendingPublishes { provider_id, reply })
            .is_err()
        {
            return 0;
        }
        response.await.unwrap_or(0)
    }
}

impl Default for ResourceProviderManager {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
