//! Per-asset widgets

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    routing::get,
    Router,
};
use chrono::Utc;

use edge_core::Asset;
use edge_services::{build_asset_card, build_supercard, Resolver};

use crate::error::ApiResult;
use crate::response::{cache, cached_json};
use crate::AppState;

/// Create asset routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets/{symbol}/card", get(card))
        .route("/assets/{symbol}/supercard", get(supercard))
}

async fn card(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let asset: Asset = symbol.parse()?;
    let resolver = Resolver::new(state.store.as_ref(), &state.config.ttl, Utc::now());
    let card = build_asset_card(&resolver, asset)?;
    cached_json(&headers, cache::CARD, &card)
}

async fn supercard(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let asset: Asset = symbol.parse()?;
    let resolver = Resolver::new(state.store.as_ref(), &state.config.ttl, Utc::now());
    let card = build_supercard(&resolver, &state.config.supercard, asset)?;
    cached_json(&headers, cache::SUPERCARD, &card)
}
