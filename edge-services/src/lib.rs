//! Services for the EdgeBlocks widget API
//!
//! This crate contains the snapshot store, the widget policy configuration,
//! the composite builders, the alerts ticker, and the fear & greed feed cache.

pub mod alerts;
pub mod asset_card;
pub mod config;
pub mod fear_greed;
pub mod market_overview;
pub mod paper;
pub mod regime;
pub mod resolver;
pub mod signals;
pub mod store;
pub mod supercard;
pub mod telemetry;

pub use alerts::{build_alerts_live, AlertCategory, AlertItem, AlertKind, AlertsFeed};
pub use asset_card::{build_asset_card, AssetCard};
pub use config::{
    AlertsPolicy, AxisLabel, AxisPolicy, ConfigError, EdgeConfig, FeedConfig, PaperConfig,
    RegimePolicy, ScorecardPolicy, MAX_WINDOW_DAYS,
};
pub use fear_greed::{resolve_fear_greed, FearGreedResponse, FeedOutcome, FeedResult};
pub use market_overview::{build_market_overview, MarketOverview, Tile};
pub use paper::{build_paper_summary, PaperSummary, PaperTrade, TradeStats};
pub use regime::{build_regime, Regime};
pub use resolver::{Dependency, Resolved, Resolver, Source, SourceView};
pub use store::{SnapshotStore, SqliteSnapshotStore, StoreError};
pub use supercard::{build_supercard, PillarStatus, SuperCard};
pub use telemetry::{build_data_telemetry, DataTelemetry};
