//! Health check endpoints

use axum::{extract::State, http::HeaderMap, response::Response, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use edge_core::RESPONSE_VERSION;

use crate::error::ApiResult;
use crate::response::{cache, cached_json};
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
    api: &'static str,
    version: &'static str,
    store: &'static str,
    ts: DateTime<Utc>,
}

/// Health check handler; a broken store degrades but does not fail
async fn health_check(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let store = match state.store.list() {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Health check: snapshot store unavailable: {}", e);
            "unavailable"
        }
    };

    let response = HealthResponse {
        ok: true,
        service: "edge-api",
        api: "v1",
        version: RESPONSE_VERSION,
        store,
        ts: Utc::now(),
    };

    cached_json(&headers, cache::HEALTH, &response)
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
