//! Health check payload.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Response body for `GET /health`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is serving.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Number of subscribed resource providers.
    pub providers: usize,
}

/// Build a health response.
#[must_use]
pub fn health_check(start_time: Instant, providers: usize) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        providers,
    }
}
