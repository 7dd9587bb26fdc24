//! Operator telemetry

use axum::{extract::State, http::HeaderMap, response::Response, routing::get, Router};
use chrono::Utc;

use edge_services::build_data_telemetry;

use crate::error::ApiResult;
use crate::response::{cache, cached_json};
use crate::AppState;

/// Create telemetry routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/telemetry/data", get(data))
}

async fn data(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let telemetry = build_data_telemetry(state.store.as_ref(), &state.config.ttl, Utc::now());
    cached_json(&headers, cache::TELEMETRY, &telemetry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_json, state};
    use edge_services::SnapshotStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_lists_stored_keys() {
        let (state, store) = state();
        store.upsert("coingecko:global", &json!({"data": {}})).unwrap();

        let body = body_json(data(State(state), HeaderMap::new()).await.unwrap()).await;
        assert_eq!(body["available"], true);
        assert_eq!(body["total_keys"], 1);
        assert_eq!(body["fresh"], 1);
        assert_eq!(body["snapshots"][0]["key"], "coingecko:global");
    }
}
