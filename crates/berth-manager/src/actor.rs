//! The manager actor: a single task owning all protocol state.
//!
//! Every mutation of the session registry, every write to a session's
//! connection, and every change to a pending-publish map happens on this
//! task, which serializes them and gives the per-session ordering guarantee.
//! Handlers are synchronous; the only await point is the command receive.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use uuid::Uuid;

use berth_core::calls::{
    ProviderCall, PublishResourcesStatus, Subscribe, UpdateOfferOperationStatus,
    UpdatePublishResourcesStatus, UpdateState,
};
use berth_core::events::Event;
use berth_core::ids::{ProviderId, StreamId};
use berth_core::messages::{
    ApplyOfferOperationMessage, OfferOperationUpdateAcknowledgement, ProviderMessage,
    ReconcileOfferOperationsRequest, UpdateOfferOperationStatusMessage, UpdateStateMessage,
};
use berth_core::operations::derive_provider_id;
use berth_core::resources::{group_by_provider, Resource};

use crate::connection::ProviderConnection;
use crate::error::{CallError, PublishError};
use crate::session::ProviderSession;

/// One-shot handle completing a single publish group.
pub(crate) type PublishReceiver = oneshot::Receiver<Result<(), PublishError>>;

/// Work submitted to the actor.
pub(crate) enum Command {
    Subscribe {
        connection: ProviderConnection,
        subscribe: Subscribe,
    },
    ProviderCall {
        resource_provider_id: ProviderId,
        stream_id: Option<String>,
        call: ProviderCall,
        reply: oneshot::Sender<Result<(), CallError>>,
    },
    ApplyOfferOperation {
        message: ApplyOfferOperationMessage,
    },
    AcknowledgeOfferOperationUpdate {
        message: OfferOperationUpdateAcknowledgement,
    },
    ReconcileOfferOperations {
        message: ReconcileOfferOperationsRequest,
    },
    PublishResources {
        resources: Vec<Resource>,
        reply: oneshot::Sender<Result<Vec<PublishReceiver>, PublishError>>,
    },
    ReaderClosed {
        provider_id: ProviderId,
        stream_id: StreamId,
    },
    SubscribedProviders {
        reply: oneshot::Sender<Vec<ProviderId>>,
    },
    PendingPublishes {
        provider_id: ProviderId,
        reply: oneshot::Sender<usize>,
    },
}

pub(crate) struct ManagerActor {
    registry: HashMap<ProviderId, ProviderSession>,
    messages: mpsc::UnboundedSender<ProviderMessage>,
    /// Weak handle for reader-closed watchers; weak so in-flight watchers
    /// never keep the actor alive after the façade is dropped.
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl ManagerActor {
    pub fn new(
        messages: mpsc::UnboundedSender<ProviderMessage>,
        commands: mpsc::WeakUnboundedSender<Command>,
    ) -> Self {
        Self {
            registry: HashMap::new(),
            messages,
            commands,
        }
    }

    /// Drain commands until every façade handle is gone, then drop the
    /// registry, which closes all writers and fails all pending publishes.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        info!(
            providers = self.registry.len(),
            "resource provider manager stopped"
        );
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Subscribe {
                connection,
                subscribe,
            } => self.subscribe(connection, subscribe),
            Command::ProviderCall {
                resource_provider_id,
                stream_id,
                call,
                reply,
            } => {
                let result = self.provider_call(&resource_provider_id, stream_id, call);
                let _ = reply.send(result);
            }
            Command::ApplyOfferOperation { message } => self.apply_offer_operation(message),
            Command::AcknowledgeOfferOperationUpdate { message } => {
                self.acknowledge_offer_operation_update(message);
            }
            Command::ReconcileOfferOperations { message } => {
                self.reconcile_offer_operations(message);
            }
            Command::PublishResources { resources, reply } => {
                let _ = reply.send(self.publish_resources(resources));
            }
            Command::ReaderClosed {
                provider_id,
                stream_id,
            } => self.reader_closed(&provider_id, stream_id),
            Command::SubscribedProviders { reply } => {
                let _ = reply.send(self.registry.keys().cloned().collect());
            }
            Command::PendingPublishes { provider_id, reply } => {
                let pending = self
                    .registry
                    .get(&provider_id)
                    .map_or(0, |session| session.pending_publishes.len());
                let _ = reply.send(pending);
            }
        }
    }

    // ── Subscribe / teardown ────────────────────────────────────────────

    fn subscribe(&mut self, connection: ProviderConnection, subscribe: Subscribe) {
        let mut info = subscribe.info;

        // First subscribe: assign a fresh identity. A resubscribing
        // provider presents its previously assigned ID, which is trusted
        // as-is (no checkpoint to validate against).
        let provider_id = match &info.id {
            Some(id) => id.clone(),
            None => {
                let id = ProviderId::new();
                info.id = Some(id.clone());
                id
            }
        };

        info!(
            provider_type = %info.kind,
            provider_name = %info.name,
            %provider_id,
            stream_id = %connection.stream_id(),
            "subscribing resource provider"
        );

        let session = ProviderSession::new(provider_id.clone(), info, connection);

        // The assigned ID travels back as the very first frame on the new
        // stream. A synchronously dead connection aborts the subscribe
        // before the session becomes observable.
        let subscribed = Event::Subscribed {
            provider_id: provider_id.clone(),
        };
        if !session.connection.send(&subscribed) {
            warn!(
                %provider_id,
                "failed to send SUBSCRIBED event to resource provider: connection closed"
            );
            return;
        }

        // Reader-closed observer. It reports the stream ID it watched so a
        // fast resubscribe that already replaced this session is left alone.
        let stream_id = session.connection.stream_id();
        let closed = session.connection.watch_closed();
        let commands = self.commands.clone();
        let watched_provider = provider_id.clone();
        let _ = tokio::spawn(async move {
            closed.await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::ReaderClosed {
                    provider_id: watched_provider,
                    stream_id,
                });
            }
        });

        // Replace any prior session for this provider: its writer closes
        // and its pending publishes fail before the new entry is visible.
        if let Some(prior) = self.registry.remove(&provider_id) {
            info!(
                %provider_id,
                prior_stream_id = %prior.connection.stream_id(),
                "replacing existing resource provider session"
            );
            drop(prior);
        }
        let _ = self.registry.insert(provider_id, session);
    }

    fn reader_closed(&mut self, provider_id: &ProviderId, stream_id: StreamId) {
        // Remove only the session instance the watcher observed; a newer
        // session for the same provider carries a different stream ID.
        let is_current = self
            .registry
            .get(provider_id)
            .is_some_and(|session| session.connection.stream_id() == stream_id);
        if is_current {
            let _ = self.registry.remove(provider_id);
            info!(%provider_id, %stream_id, "resource provider disconnected");
        }
    }

    // ── Provider-initiated calls ────────────────────────────────────────

    fn provider_call(
        &mut self,
        provider_id: &ProviderId,
        stream_id: Option<String>,
        call: ProviderCall,
    ) -> Result<(), CallError> {
        let session = self
            .registry
            .get_mut(provider_id)
            .ok_or(CallError::NotSubscribed)?;

        // Non-subscribe calls must prove stream freshness.
        let given = stream_id.ok_or(CallError::MissingStreamId)?;
        if given != session.connection.stream_id().to_string() {
            return Err(CallError::StaleStreamId {
                given,
                provider_id: provider_id.clone(),
            });
        }

        match call {
            ProviderCall::Unknown => Err(CallError::NotImplemented),
            ProviderCall::UpdateOfferOperationStatus(update) => {
                Self::update_offer_operation_status(&self.messages, update);
                Ok(())
            }
            ProviderCall::UpdateState(update) => {
                Self::update_state(&self.messages, session, update);
                Ok(())
            }
            ProviderCall::UpdatePublishResourcesStatus(update) => {
                Self::update_publish_resources_status(session, update);
                Ok(())
            }
        }
    }

    fn update_offer_operation_status(
        messages: &mpsc::UnboundedSender<ProviderMessage>,
        update: UpdateOfferOperationStatus,
    ) {
        let message = UpdateOfferOperationStatusMessage {
            framework_id: update.framework_id,
            status: update.status,
            latest_status: update.latest_status,
            operation_uuid: update.operation_uuid,
        };
        let _ = messages.send(ProviderMessage::UpdateOfferOperationStatus(message));
    }

    fn update_state(
        messages: &mpsc::UnboundedSender<ProviderMessage>,
        session: &ProviderSession,
        update: UpdateState,
    ) {
        // A resource claiming another provider's identity means the
        // provider-side agent is broken; that is a bug, not an operational
        // condition.
        for resource in &update.resources {
            assert_eq!(
                resource.provider_id.as_ref(),
                Some(&session.provider_id),
                "resource from provider {} names a different provider",
                session.provider_id
            );
        }

        let resource_version =
            Uuid::from_slice(&update.resource_version_uuid).unwrap_or_else(|parse_error| {
                panic!(
                    "malformed resource version from resource provider {}: {parse_error}",
                    session.provider_id
                )
            });

        let mut operations = HashMap::with_capacity(update.operations.len());
        for operation in update.operations {
            let uuid = Uuid::from_slice(&operation.operation_uuid).unwrap_or_else(|parse_error| {
                panic!(
                    "malformed operation UUID from resource provider {}: {parse_error}",
                    session.provider_id
                )
            });
            let _ = operations.insert(uuid, operation);
        }

        info!(
            provider_id = %session.provider_id,
            resources = update.resources.len(),
            operations = operations.len(),
            "received UPDATE_STATE call from resource provider"
        );

        let message = UpdateStateMessage {
            info: session.info.clone(),
            resource_version,
            resources: update.resources,
            operations,
        };
        let _ = messages.send(ProviderMessage::UpdateState(message));
    }

    fn update_publish_resources_status(
        session: &mut ProviderSession,
        update: UpdatePublishResourcesStatus,
    ) {
        let uuid = match Uuid::from_slice(&update.uuid) {
            Ok(uuid) => uuid,
            Err(parse_error) => {
                error!(
                    provider_id = %session.provider_id,
                    %parse_error,
                    "invalid UUID in publish status update from resource provider"
                );
                return;
            }
        };

        // Stale or duplicate report: state stays untouched.
        let Some(pending) = session.pending_publishes.remove(&uuid) else {
            error!(
                provider_id = %session.provider_id,
                publish_uuid = %uuid,
                "ignoring publish status update for unknown UUID"
            );
            return;
        };

        info!(
            provider_id = %session.provider_id,
            publish_uuid = %uuid,
            status = update.status.as_str(),
            "received publish status update from resource provider"
        );

        let result = if update.status == PublishResourcesStatus::Ok {
            Ok(())
        } else {
            Err(PublishError::Rejected {
                provider_id: session.provider_id.clone(),
                status: update.status.as_str(),
            })
        };
        let _ = pending.send(result);
    }

    // ── Host-initiated operations ───────────────────────────────────────

    fn apply_offer_operation(&mut self, message: ApplyOfferOperationMessage) {
        let ApplyOfferOperationMessage {
            framework_id,
            operation,
            operation_uuid,
            resource_version_uuid,
        } = message;

        let uuid = match Uuid::from_slice(&operation_uuid) {
            Ok(uuid) => uuid,
            Err(parse_error) => {
                error!(
                    operation = %operation.id,
                    %framework_id,
                    %parse_error,
                    "failed to parse offer operation UUID"
                );
                return;
            }
        };

        let provider_id = match derive_provider_id(&operation) {
            Ok(Some(provider_id)) => provider_id,
            Ok(None) => {
                error!(
                    operation = %operation.id,
                    operation_uuid = %uuid,
                    %framework_id,
                    "failed to get the resource provider ID of operation: not found"
                );
                return;
            }
            Err(derive_error) => {
                error!(
                    operation = %operation.id,
                    operation_uuid = %uuid,
                    %framework_id,
                    error = %derive_error,
                    "failed to get the resource provider ID of operation"
                );
                return;
            }
        };

        let Some(session) = self.registry.get(&provider_id) else {
            warn!(
                operation = %operation.id,
                operation_uuid = %uuid,
                %framework_id,
                %provider_id,
                "dropping operation because resource provider is not subscribed"
            );
            return;
        };

        // The resource version must have been minted by the same provider
        // the operation resolves to; a mismatch is a host-side bug.
        assert_eq!(
            resource_version_uuid.provider_id.as_ref(),
            Some(&provider_id),
            "resource provider ID in resource version UUID does not match that of operation '{}'",
            operation.id
        );

        let event = Event::ApplyOfferOperation {
            framework_id: framework_id.clone(),
            info: operation,
            operation_uuid,
            resource_version_uuid: resource_version_uuid.uuid,
        };
        if !session.connection.send(&event) {
            warn!(
                operation_uuid = %uuid,
                %framework_id,
                %provider_id,
                "failed to send operation to resource provider: connection closed"
            );
        }
    }

    fn acknowledge_offer_operation_update(
        &mut self,
        message: OfferOperationUpdateAcknowledgement,
    ) {
        let Some(session) = self.registry.get(&message.resource_provider_id) else {
            warn!(
                status_uuid = %message.status_uuid,
                operation_uuid = %message.operation_uuid,
                provider_id = %message.resource_provider_id,
                "dropping offer operation update acknowledgement because resource provider \
                 is not subscribed"
            );
            return;
        };

        let event = Event::AcknowledgeOfferOperation {
            status_uuid: message.status_uuid.as_bytes().to_vec(),
            operation_uuid: message.operation_uuid.as_bytes().to_vec(),
        };
        if !session.connection.send(&event) {
            warn!(
                status_uuid = %message.status_uuid,
                operation_uuid = %message.operation_uuid,
                provider_id = %message.resource_provider_id,
                "failed to send offer operation update acknowledgement: connection closed"
            );
        }
    }

    fn reconcile_offer_operations(&mut self, message: ReconcileOfferOperationsRequest) {
        // One event per subscribed provider, listing that provider's
        // operation UUIDs. Operations without a provider ID are ignored.
        let mut grouped: HashMap<ProviderId, Vec<Vec<u8>>> = HashMap::new();
        for operation in message.operations {
            let Some(provider_id) = operation.resource_provider_id else {
                continue;
            };
            if !self.registry.contains_key(&provider_id) {
                warn!(
                    operation_uuid = %operation.operation_uuid,
                    %provider_id,
                    "dropping offer operation reconciliation because resource provider \
                     is not subscribed"
                );
                continue;
            }
            grouped
                .entry(provider_id)
                .or_default()
                .push(operation.operation_uuid.as_bytes().to_vec());
        }

        for (provider_id, operation_uuids) in grouped {
            let Some(session) = self.registry.get(&provider_id) else {
                continue;
            };
            let event = Event::ReconcileOfferOperations { operation_uuids };
            if !session.connection.send(&event) {
                warn!(
                    %provider_id,
                    "failed to send offer operation reconciliation event: connection closed"
                );
            }
        }
    }

    fn publish_resources(
        &mut self,
        resources: Vec<Resource>,
    ) -> Result<Vec<PublishReceiver>, PublishError> {
        // Resources without a provider ID are agent-default and skipped.
        let grouped = group_by_provider(&resources);

        // Fail the whole call up front if any involved provider is gone.
        for provider_id in grouped.keys() {
            if !self.registry.contains_key(provider_id) {
                return Err(PublishError::NotSubscribed(provider_id.clone()));
            }
        }

        let mut receivers = Vec::with_capacity(grouped.len());
        for (provider_id, resources) in grouped {
            let uuid = Uuid::new_v4();
            let event = Event::PublishResources { uuid, resources };

            let Some(session) = self.registry.get_mut(&provider_id) else {
                continue;
            };

            info!(
                %provider_id,
                publish_uuid = %uuid,
                "sending PUBLISH_RESOURCES event to resource provider"
            );

            // An earlier group may already have gone out; its pending entry
            // completes or fails on session teardown like any other.
            if !session.connection.send(&event) {
                return Err(PublishError::SendFailed(provider_id));
            }

            let (sender, receiver) = oneshot::channel();
            let _ = session.pending_publishes.insert(uuid, sender);
            receivers.push(receiver);
        }

        Ok(receivers)
    }
}
