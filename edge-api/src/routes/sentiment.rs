//! Fear & Greed widget

use axum::{extract::State, http::HeaderMap, response::Response, routing::get, Router};
use chrono::Utc;

use edge_services::resolve_fear_greed;

use crate::error::ApiResult;
use crate::response::{cache, cached_json};
use crate::AppState;

/// Create sentiment routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/sentiment/fear-greed", get(fear_greed))
}

async fn fear_greed(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let now = Utc::now();
    let result =
        resolve_fear_greed(state.store.as_ref(), state.feed.as_ref(), &state.config, now).await;
    let response = result.into_response(state.feed.provider(), now);
    cached_json(&headers, cache::FEAR_GREED, &response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_json, state};
    use serde_json::json;

    #[tokio::test]
    async fn test_serves_young_cache() {
        let (state, store) = state();
        store
            .put_at(
                "altme:fear_greed",
                &json!({"data": [{"value": "64", "value_classification": "Greed"}]}),
                Some(Utc::now()),
            )
            .unwrap();

        let body = body_json(fear_greed(State(state), HeaderMap::new()).await.unwrap()).await;
        assert_eq!(body["current"]["value"], 64);
        assert_eq!(body["source"]["outcome"], "cached");
        assert_eq!(body["source"]["provider"], "alternative.me");
    }

    #[tokio::test]
    async fn test_unreachable_provider_without_cache_is_neutral() {
        let (state, _) = state();
        let body = body_json(fear_greed(State(state), HeaderMap::new()).await.unwrap()).await;
        assert_eq!(body["current"]["value"], 50);
        assert_eq!(body["current"]["label"], "Neutral");
        assert_eq!(body["source"]["outcome"], "default");
    }
}
