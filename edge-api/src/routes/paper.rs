//! Paper trading widget

use axum::{extract::State, http::HeaderMap, response::Response, routing::get, Router};
use chrono::Utc;

use edge_services::{build_paper_summary, Resolver};

use crate::error::ApiResult;
use crate::response::{cache, cached_json};
use crate::AppState;

/// Create paper trading routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/paper/summary", get(summary))
}

async fn summary(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let resolver = Resolver::new(state.store.as_ref(), &state.config.ttl, Utc::now());
    let summary = build_paper_summary(&resolver, &state.config.paper)?;
    cached_json(&headers, cache::PAPER, &summary)
}
