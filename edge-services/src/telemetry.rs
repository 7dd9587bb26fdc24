//! Snapshot freshness telemetry for operators

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use edge_core::{keys, Freshness, FreshnessStatus, TtlPolicy, TtlSource, RESPONSE_VERSION};

use crate::store::SnapshotStore;

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotRow {
    pub key: String,
    pub updated_at: Option<DateTime<Utc>>,
    /// Age in seconds, one decimal
    pub age_s: Option<f64>,
    pub ttl_s: u64,
    pub ttl_source: TtlSource,
    pub status: FreshnessStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataTelemetry {
    pub ts: DateTime<Utc>,
    pub version: &'static str,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub total_keys: usize,
    pub fresh: usize,
    pub stale: usize,
    pub dead: usize,
    pub snapshots: Vec<SnapshotRow>,
}

impl DataTelemetry {
    fn unavailable(now: DateTime<Utc>, reason: String) -> Self {
        Self {
            ts: now,
            version: RESPONSE_VERSION,
            available: false,
            reason: Some(reason),
            total_keys: 0,
            fresh: 0,
            stale: 0,
            dead: 0,
            snapshots: Vec::new(),
        }
    }
}

/// Freshness of every stored dataset, skipping collector bookkeeping keys
pub fn build_data_telemetry(
    store: &dyn SnapshotStore,
    ttl: &TtlPolicy,
    now: DateTime<Utc>,
) -> DataTelemetry {
    let metas = match store.list() {
        Ok(metas) => metas,
        Err(e) => {
            warn!("Snapshot listing failed: {}", e);
            return DataTelemetry::unavailable(now, e.to_string());
        }
    };

    let snapshots: Vec<SnapshotRow> = metas
        .into_iter()
        .filter(|meta| !meta.key.starts_with(keys::COOLDOWN_PREFIX))
        .map(|meta| {
            let (ttl_s, ttl_source) = ttl.lookup(&meta.key);
            let freshness = Freshness::evaluate(meta.updated_at, ttl_s, now);
            SnapshotRow {
                age_s: freshness.age_secs.map(|age| (age * 10.0).round() / 10.0),
                status: freshness.status,
                key: meta.key,
                updated_at: meta.updated_at,
                ttl_s,
                ttl_source,
            }
        })
        .collect();

    let count = |status: FreshnessStatus| snapshots.iter().filter(|s| s.status == status).count();

    DataTelemetry {
        ts: now,
        version: RESPONSE_VERSION,
        available: true,
        reason: None,
        total_keys: snapshots.len(),
        fresh: count(FreshnessStatus::Fresh),
        stale: count(FreshnessStatus::Stale),
        dead: count(FreshnessStatus::Dead),
        snapshots,
    }
}
