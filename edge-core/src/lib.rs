//! Core types for the EdgeBlocks widget API
//!
//! This crate defines the shared data structures and the pure logic behind
//! the widget endpoints: snapshot freshness, path-based field extraction,
//! KPI values, rule tables, and series reduction.

pub mod asset;
pub mod error;
pub mod format;
pub mod freshness;
pub mod keys;
pub mod kpi;
pub mod path;
pub mod rules;
pub mod series;
pub mod snapshot;
pub mod ttl;

pub use asset::Asset;
pub use error::{EdgeError, EdgeResult};
pub use freshness::{Freshness, FreshnessStatus};
pub use kpi::{extract, FieldSpec, KpiKind, KpiValue, KpiView, Transform};
pub use path::{Lookup, PathExpr, Step};
pub use rules::{Band, BandLevel, Cmp, Condition, ConfidenceScale, Facts, Rule, RuleTable};
pub use series::{downsample, max_drawdown, max_drawdown_pct, Drawdown, SeriesPoint};
pub use snapshot::{Snapshot, SnapshotMeta};
pub use ttl::{TtlPolicy, TtlSource, DEFAULT_TTL_SECS};

/// Version tag carried by every composite response
pub const RESPONSE_VERSION: &str = "v0.2-live";
