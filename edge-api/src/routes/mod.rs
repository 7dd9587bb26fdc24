//! API route definitions

mod alerts;
mod assets;
mod health;
mod market;
mod paper;
mod sentiment;
mod telemetry;

use axum::Router;
use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(market::routes())
        .merge(assets::routes())
        .merge(sentiment::routes())
        .merge(paper::routes())
        .merge(alerts::routes())
        .merge(telemetry::routes())
}
