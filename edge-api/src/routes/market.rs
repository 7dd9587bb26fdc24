//! Market-wide widgets

use axum::{extract::State, http::HeaderMap, response::Response, routing::get, Router};
use chrono::Utc;
use tracing::debug;

use edge_services::{build_market_overview, build_regime, Resolver};

use crate::error::ApiResult;
use crate::response::{cache, cached_json};
use crate::AppState;

/// Create market routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/market/overview", get(overview))
        .route("/market/regime", get(regime))
}

async fn overview(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let resolver = Resolver::new(state.store.as_ref(), &state.config.ttl, Utc::now());
    let overview = build_market_overview(&resolver)?;
    debug!("Market overview with {} sources", overview.sources.len());
    cached_json(&headers, cache::OVERVIEW, &overview)
}

async fn regime(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let resolver = Resolver::new(state.store.as_ref(), &state.config.ttl, Utc::now());
    let regime = build_regime(&resolver, &state.config.regime)?;
    debug!(
        "Regime {} ({})",
        regime.regime.label, regime.regime.confidence
    );
    cached_json(&headers, cache::REGIME, &regime)
}
