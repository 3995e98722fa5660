//! End-to-end tests driving the resource provider endpoint over real HTTP.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::time::timeout;
use tokio_util::codec::Decoder as _;

use berth_core::ids::ProviderId;
use berth_core::messages::{ProviderMessage, ReconcileOfferOperationsRequest, ReconcileOperation};
use berth_core::resources::Resource;
use berth_manager::ResourceProviderManager;
use berth_server::server::API_PATH;
use berth_server::{BerthServer, ServerConfig};
use berth_wire::call::{
    Call, CallType, PublishResourcesStatus, Subscribe, UpdatePublishResourcesStatus, UpdateState,
};
use berth_wire::common::{ProviderInfo, Resource as WireResource};
use berth_wire::event::EventType;
use berth_wire::recordio::RecordIoDecoder;
use berth_wire::{decode_event, encode_call, ContentType};

const TIMEOUT: Duration = Duration::from_secs(5);
const STREAM_ID_HEADER: &str = "Mesos-Stream-Id";

struct TestServer {
    base: String,
    server: BerthServer,
    _handle: tokio::task::JoinHandle<()>,
}

async fn boot_server() -> TestServer {
    let manager = Arc::new(ResourceProviderManager::new());
    let server = BerthServer::new(ServerConfig::default(), manager);
    let (addr, handle) = server.listen().await.unwrap();
    TestServer {
        base: format!("http://{addr}{API_PATH}"),
        server,
        _handle: handle,
    }
}

/// Reads record-IO framed events off a streaming response body.
struct EventStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buf: BytesMut,
    decoder: RecordIoDecoder,
}

impl EventStream {
    fn new(response: reqwest::Response) -> Self {
        Self {
            inner: Box::pin(response.bytes_stream()),
            buf: BytesMut::new(),
            decoder: RecordIoDecoder::new(),
        }
    }

    async fn next_event(&mut self) -> berth_wire::Event {
        loop {
            if let Some(record) = self.decoder.decode(&mut self.buf).unwrap() {
                return decode_event(ContentType::Json, &record).unwrap();
            }
            let chunk = timeout(TIMEOUT, self.inner.next())
                .await
                .expect("timed out waiting for event")
                .expect("stream ended")
                .expect("transport error");
            self.buf.extend_from_slice(&chunk);
        }
    }
}

fn subscribe_call(id: Option<&str>) -> Call {
    Call {
        r#type: CallType::Subscribe as i32,
        subscribe: Some(Subscribe {
            resource_provider_info: Some(ProviderInfo {
                r#type: "org.example.rp".into(),
                name: "disk".into(),
                id: id.map(Into::into),
            }),
        }),
        ..Default::default()
    }
}

async fn post_json(
    client: &reqwest::Client,
    base: &str,
    call: &Call,
    stream_id: Option<&str>,
) -> reqwest::Response {
    let mut request = client
        .post(base)
        .header("Content-Type", "application/json")
        .body(encode_call(ContentType::Json, call).unwrap());
    if let Some(stream_id) = stream_id {
        request = request.header(STREAM_ID_HEADER, stream_id);
    }
    request.send().await.unwrap()
}

/// Subscribe and consume the SUBSCRIBED frame.
async fn subscribe(
    client: &reqwest::Client,
    base: &str,
    id: Option<&str>,
) -> (String, String, EventStream) {
    let response = post_json(client, base, &subscribe_call(id), None).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let stream_id = response
        .headers()
        .get(STREAM_ID_HEADER)
        .expect("stream ID header")
        .to_str()
        .unwrap()
        .to_owned();

    let mut events = EventStream::new(response);
    let event = events.next_event().await;
    assert_eq!(event.r#type, EventType::Subscribed as i32);
    let provider_id = event.subscribed.unwrap().provider_id.unwrap();
    (provider_id, stream_id, events)
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ── Scenarios ───────────────────────────────────────────────────────────

#[tokio::test]
async fn first_subscribe_streams_subscribed_event() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();

    let response = post_json(&client, &ts.base, &subscribe_call(None), None).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "application/json"
    );
    let stream_id = response.headers().get(STREAM_ID_HEADER).unwrap();
    assert!(uuid::Uuid::parse_str(stream_id.to_str().unwrap()).is_ok());

    let mut events = EventStream::new(response);
    let event = events.next_event().await;
    assert_eq!(event.r#type, EventType::Subscribed as i32);
    let provider_id = event.subscribed.unwrap().provider_id.unwrap();
    assert!(uuid::Uuid::parse_str(&provider_id).is_ok());
}

#[tokio::test]
async fn publish_resolves_after_ok_status_report() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();
    let (provider_id, stream_id, mut events) = subscribe(&client, &ts.base, None).await;

    let manager = ts.server.manager().clone();
    let publish = {
        let manager = manager.clone();
        let resources = vec![Resource::new(ProviderId::from(provider_id.clone()), "disk", 64.0)];
        tokio::spawn(async move { manager.publish_resources(resources).await })
    };

    let event = events.next_event().await;
    assert_eq!(event.r#type, EventType::PublishResources as i32);
    let publish_payload = event.publish_resources.unwrap();
    assert_eq!(publish_payload.resources.len(), 1);

    let status_call = Call {
        r#type: CallType::UpdatePublishResourcesStatus as i32,
        resource_provider_id: Some(provider_id.clone()),
        update_publish_resources_status: Some(UpdatePublishResourcesStatus {
            uuid: publish_payload.uuid,
            status: PublishResourcesStatus::Ok as i32,
        }),
        ..Default::default()
    };
    let response = post_json(&client, &ts.base, &status_call, Some(&stream_id)).await;
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    publish.await.unwrap().unwrap();
    assert_eq!(
        manager
            .pending_publishes(ProviderId::from(provider_id))
            .await,
        0
    );
}

#[tokio::test]
async fn publish_fails_when_subscriber_disconnects() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();
    let (provider_id, _, mut events) = subscribe(&client, &ts.base, None).await;

    let manager = ts.server.manager().clone();
    let publish = {
        let manager = manager.clone();
        let resources = vec![Resource::new(ProviderId::from(provider_id.clone()), "disk", 64.0)];
        tokio::spawn(async move { manager.publish_resources(resources).await })
    };

    let event = events.next_event().await;
    assert_eq!(event.r#type, EventType::PublishResources as i32);

    // Close the reader: the client walks away mid-publish.
    drop(events);

    let error = publish.await.unwrap().unwrap_err();
    assert!(error.to_string().contains("connection closed"));

    wait_until(|| async { manager.subscribed_providers().await.is_empty() }).await;
}

#[tokio::test]
async fn resubscribe_fences_stale_stream_ids() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();
    let mut messages = ts.server.manager().take_messages().unwrap();

    let (provider_id, first_stream, _first_events) = subscribe(&client, &ts.base, None).await;
    let (second_id, second_stream, _second_events) =
        subscribe(&client, &ts.base, Some(&provider_id)).await;

    // Same identity, fresh stream.
    assert_eq!(second_id, provider_id);
    assert_ne!(first_stream, second_stream);
    assert_eq!(ts.server.manager().subscribed_providers().await.len(), 1);

    let update_state = Call {
        r#type: CallType::UpdateState as i32,
        resource_provider_id: Some(provider_id.clone()),
        update_state: Some(UpdateState {
            resources: vec![WireResource {
                provider_id: Some(provider_id.clone()),
                name: "disk".into(),
                value: 64.0,
            }],
            resource_version_uuid: uuid::Uuid::new_v4().as_bytes().to_vec(),
            operations: vec![],
        }),
        ..Default::default()
    };

    // Stale stream ID: fenced out.
    let stale = post_json(&client, &ts.base, &update_state, Some(&first_stream)).await;
    assert_eq!(stale.status(), reqwest::StatusCode::BAD_REQUEST);

    // Current stream ID: accepted and surfaced to the host.
    let fresh = post_json(&client, &ts.base, &update_state, Some(&second_stream)).await;
    assert_eq!(fresh.status(), reqwest::StatusCode::ACCEPTED);

    let message = timeout(TIMEOUT, messages.recv()).await.unwrap().unwrap();
    match message {
        ProviderMessage::UpdateState(update) => {
            assert_eq!(update.info.id, Some(ProviderId::from(provider_id)));
            assert_eq!(update.resources.len(), 1);
        }
        other => panic!("unexpected message {other:?}"),
    }
}

#[tokio::test]
async fn reconcile_fans_out_to_subscribed_providers_only() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();

    let (p1, _, mut events1) = subscribe(&client, &ts.base, None).await;
    let (p2, _, mut events2) = subscribe(&client, &ts.base, None).await;

    let op1 = uuid::Uuid::new_v4();
    let op2 = uuid::Uuid::new_v4();
    let op3 = uuid::Uuid::new_v4();
    ts.server
        .manager()
        .reconcile_offer_operations(ReconcileOfferOperationsRequest {
            operations: vec![
                ReconcileOperation {
                    resource_provider_id: Some(ProviderId::from(p1.clone())),
                    operation_uuid: op1,
                },
                ReconcileOperation {
                    resource_provider_id: Some(ProviderId::from(p1)),
                    operation_uuid: op2,
                },
                ReconcileOperation {
                    resource_provider_id: Some(ProviderId::from(p2)),
                    operation_uuid: op3,
                },
                ReconcileOperation {
                    resource_provider_id: Some(ProviderId::from("unknown-provider")),
                    operation_uuid: uuid::Uuid::new_v4(),
                },
            ],
        });

    let event1 = events1.next_event().await;
    assert_eq!(event1.r#type, EventType::ReconcileOfferOperations as i32);
    let uuids1 = event1.reconcile_offer_operations.unwrap().operation_uuids;
    assert_eq!(uuids1.len(), 2);
    assert!(uuids1.contains(&op1.as_bytes().to_vec()));
    assert!(uuids1.contains(&op2.as_bytes().to_vec()));

    let event2 = events2.next_event().await;
    let uuids2 = event2.reconcile_offer_operations.unwrap().operation_uuids;
    assert_eq!(uuids2, vec![op3.as_bytes().to_vec()]);
}

// ── Transport boundary behaviors ────────────────────────────────────────

#[tokio::test]
async fn wrong_content_type_is_415_listing_supported_types() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&ts.base)
        .header("Content-Type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let text = response.text().await.unwrap();
    assert!(text.contains("application/json"));
    assert!(text.contains("application/x-protobuf"));
}

#[tokio::test]
async fn get_is_method_not_allowed() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();

    let response = client.get(&ts.base).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    let allow = response.headers().get("Allow").unwrap();
    assert!(allow.to_str().unwrap().contains("POST"));
}

#[tokio::test]
async fn subscribe_with_stream_id_header_is_rejected() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();

    let response = post_json(
        &client,
        &ts.base,
        &subscribe_call(None),
        Some("11111111-2222-3333-4444-555555555555"),
    )
    .await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let text = response.text().await.unwrap();
    assert!(text.contains("Mesos-Stream-Id"));
}

#[tokio::test]
async fn non_subscribe_without_stream_id_is_rejected() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();
    let (provider_id, _, _events) = subscribe(&client, &ts.base, None).await;

    let status_call = Call {
        r#type: CallType::UpdatePublishResourcesStatus as i32,
        resource_provider_id: Some(provider_id),
        update_publish_resources_status: Some(UpdatePublishResourcesStatus {
            uuid: uuid::Uuid::new_v4().as_bytes().to_vec(),
            status: PublishResourcesStatus::Ok as i32,
        }),
        ..Default::default()
    };
    let response = post_json(&client, &ts.base, &status_call, None).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let text = response.text().await.unwrap();
    assert!(text.contains("Mesos-Stream-Id"));
}

#[tokio::test]
async fn call_for_unsubscribed_provider_is_rejected() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();

    let status_call = Call {
        r#type: CallType::UpdatePublishResourcesStatus as i32,
        resource_provider_id: Some("nobody".into()),
        update_publish_resources_status: Some(UpdatePublishResourcesStatus {
            uuid: uuid::Uuid::new_v4().as_bytes().to_vec(),
            status: PublishResourcesStatus::Ok as i32,
        }),
        ..Default::default()
    };
    let response = post_json(&client, &ts.base, &status_call, Some("any")).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let text = response.text().await.unwrap();
    assert!(text.contains("not subscribed"));
}

#[tokio::test]
async fn rapid_resubscribe_fails_pending_publishes_of_first_session() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();
    let (provider_id, _, mut events) = subscribe(&client, &ts.base, None).await;

    let manager = ts.server.manager().clone();
    let publish = {
        let manager = manager.clone();
        let resources = vec![Resource::new(ProviderId::from(provider_id.clone()), "disk", 64.0)];
        tokio::spawn(async move { manager.publish_resources(resources).await })
    };
    let event = events.next_event().await;
    assert_eq!(event.r#type, EventType::PublishResources as i32);

    // Resubscribe with the same identity: the first session's pending
    // publish fails and the second starts clean.
    let (_, _, _second_events) = subscribe(&client, &ts.base, Some(&provider_id)).await;

    let error = publish.await.unwrap().unwrap_err();
    assert!(error.to_string().contains("connection closed"));
    assert_eq!(
        manager
            .pending_publishes(ProviderId::from(provider_id))
            .await,
        0
    );
}

#[tokio::test]
async fn health_reports_subscribed_providers() {
    let ts = boot_server().await;
    let client = reqwest::Client::new();
    let health_url = ts.base.replace(API_PATH, "/health");

    let before: serde_json::Value = client
        .get(&health_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before["providers"], 0);

    let (_, _, _events) = subscribe(&client, &ts.base, None).await;

    let after: serde_json::Value = client
        .get(&health_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["status"], "ok");
    assert_eq!(after["providers"], 1);
}
