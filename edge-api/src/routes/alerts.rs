//! Live alerts ticker

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use edge_services::{build_alerts_live, resolve_fear_greed, FeedOutcome, Resolver};

use crate::error::ApiResult;
use crate::response::{cache, cached_json};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<usize>,
}

/// Create alerts routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/alerts/live", get(live))
}

async fn live(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let now = Utc::now();
    let feed =
        resolve_fear_greed(state.store.as_ref(), state.feed.as_ref(), &state.config, now).await;
    // The neutral placeholder is not a reading
    let fear_greed = match feed.outcome {
        FeedOutcome::Default => None,
        _ => Some(feed.index.current.value),
    };

    let resolver = Resolver::new(state.store.as_ref(), &state.config.ttl, now);
    let alerts = build_alerts_live(&resolver, &state.config, fear_greed, query.limit)?;
    cached_json(&headers, cache::ALERTS, &alerts)
}
