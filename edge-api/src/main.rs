//! EdgeBlocks Widget API Server
//!
//! Read-only HTTP API that turns collector snapshots into widget payloads.

mod error;
mod response;
mod routes;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use edge_altme::{AltmeClient, FearGreedSource};
use edge_services::{EdgeConfig, SnapshotStore, SqliteSnapshotStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Origins allowed when `CORS_ORIGINS` is unset
const DEFAULT_ORIGINS: &str = "https://edgeblocks.io,https://www.edgeblocks.io,http://localhost:3000";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SnapshotStore>,
    pub feed: Arc<dyn FearGreedSource>,
    pub config: Arc<EdgeConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        feed: Arc<dyn FearGreedSource>,
        config: EdgeConfig,
    ) -> Self {
        Self {
            store,
            feed,
            config: Arc::new(config),
        }
    }
}

fn cors_layer() -> CorsLayer {
    let origins = std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string());
    let origins: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::IF_NONE_MATCH])
        .expose_headers([header::ETAG, header::CACHE_CONTROL])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,edge_api=debug,edge_services=debug")),
        )
        .init();

    info!("Starting EdgeBlocks Widget API");

    let config = EdgeConfig::load()?;
    info!(
        "Policy loaded: {} TTL prefixes, feed max age {}s",
        config.ttl.prefixes.len(),
        config.feed.max_age_secs
    );

    // Snapshot store written by the collector; opened read-mostly
    let db_path = std::env::var("SNAPSHOT_DB_PATH").unwrap_or_else(|_| "data/edge.db".to_string());
    info!("Opening snapshot store at: {}", db_path);
    let store = SqliteSnapshotStore::new(&db_path)?;

    let feed = AltmeClient::new(
        config.feed.url.clone(),
        Duration::from_millis(config.feed.timeout_ms),
    )?;
    info!("Fear & Greed provider: {}", feed.url());

    let state = AppState::new(Arc::new(store), Arc::new(feed), config);

    let app = Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
