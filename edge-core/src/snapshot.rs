//! Snapshot records as written by the external collector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named, timestamped JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Hierarchical key, e.g. `coinglass:open_interest:BTC`
    pub key: String,
    /// Opaque payload
    pub payload: Value,
    /// Last refresh time; `None` when the row carries no usable timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

/// Key and timestamp of a stored snapshot, without its payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotMeta {
    pub key: String,
    pub updated_at: Option<DateTime<Utc>>,
}
