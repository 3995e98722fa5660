//! `BerthServer` — the axum server hosting the resource provider endpoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, instrument};

use berth_manager::ResourceProviderManager;

use crate::api;
use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Path of the resource provider API endpoint.
pub const API_PATH: &str = "/api/v1/resource_provider";

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The manager behind the API endpoint.
    pub manager: Arc<ResourceProviderManager>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Server configuration.
    pub config: ServerConfig,
}

/// The berth HTTP server.
pub struct BerthServer {
    config: ServerConfig,
    manager: Arc<ResourceProviderManager>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl BerthServer {
    /// Create a new server around an existing manager.
    ///
    /// The host keeps its own `Arc` on the manager for the control-plane
    /// operations and the outbound message queue.
    #[must_use]
    pub fn new(config: ServerConfig, manager: Arc<ResourceProviderManager>) -> Self {
        Self {
            config,
            manager,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the axum router with all routes and middleware.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = AppState {
            manager: self.manager.clone(),
            shutdown: self.shutdown.clone(),
            start_time: self.start_time,
            config: self.config.clone(),
        };

        // `post` answers other methods on the API path with 405 and an
        // `Allow: POST` header.
        Router::new()
            .route(API_PATH, post(api_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(CatchPanicLayer::new())
            .layer(RequestBodyLimitLayer::new(self.config.max_body_bytes))
    }

    /// Bind a TCP listener and start serving. Returns the bound address and
    /// a join handle for the server task.
    #[instrument(skip_all, fields(host = %self.config.host, port = self.config.port))]
    pub async fn listen(
        &self,
    ) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), std::io::Error> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let bound_addr = listener.local_addr()?;

        info!(addr = %bound_addr, "server started");

        let router = self.router();
        let shutdown_token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_token.cancelled().await;
                    info!("server shutdown initiated");
                })
                .await;
            info!("server shutdown complete");
        });

        Ok((bound_addr, handle))
    }

    /// Get the manager.
    #[must_use]
    pub fn manager(&self) -> &Arc<ResourceProviderManager> {
        &self.manager
    }

    /// Get the shutdown coordinator.
    #[must_use]
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// POST /api/v1/resource_provider
async fn api_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    // Caller-identity extraction belongs to the surrounding HTTP stack; this
    // deployment runs without it.
    api::api(&state.manager, &headers, &body, None).await
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers = state.manager.subscribed_providers().await.len();
    Json(health::health_check(state.start_time, providers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn make_server() -> BerthServer {
        BerthServer::new(
            ServerConfig::default(),
            Arc::new(ResourceProviderManager::new()),
        )
    }

    #[tokio::test]
    async fn server_with_default_config() {
        let server = make_server();
        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.config().port, 0);
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["providers"], 0);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_on_api_path_is_method_not_allowed() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri(API_PATH)
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let allow = resp.headers().get(axum::http::header::ALLOW).unwrap();
        assert!(allow.to_str().unwrap().contains("POST"));
    }

    #[tokio::test]
    async fn post_without_content_type_is_bad_request() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder()
            .method("POST")
            .uri(API_PATH)
            .body(Body::from("{}"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_with_unsupported_content_type_is_415() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder()
            .method("POST")
            .uri(API_PATH)
            .header("Content-Type", "text/plain")
            .body(Body::from("hello"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("application/json"));
        assert!(text.contains("application/x-protobuf"));
    }

    #[tokio::test]
    async fn server_listen_binds_port() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();

        assert_ne!(addr.port(), 0); // auto-assigned

        server.shutdown().shutdown();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn server_graceful_shutdown() {
        let server = make_server();
        let (_, handle) = server.listen().await.unwrap();

        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("shutdown timed out")
            .expect("join error");
    }
}
