//! Snapshot freshness classification
//!
//! A snapshot is `fresh` while its age is below its TTL, `stale` up to twice
//! the TTL, and `dead` after that. Status is derived on every read and never
//! stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state freshness, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessStatus {
    Fresh,
    Stale,
    Dead,
}

impl FreshnessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreshnessStatus::Fresh => "fresh",
            FreshnessStatus::Stale => "stale",
            FreshnessStatus::Dead => "dead",
        }
    }
}

impl std::fmt::Display for FreshnessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status plus the age it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Freshness {
    pub status: FreshnessStatus,
    /// Age in seconds; `None` when the source has no timestamp
    pub age_secs: Option<f64>,
}

impl Freshness {
    /// Freshness of a source without a timestamp
    pub fn dead() -> Self {
        Self {
            status: FreshnessStatus::Dead,
            age_secs: None,
        }
    }

    /// Classify `updated_at` against `ttl_secs` as seen at `now`.
    ///
    /// Negative ages (collector clock ahead of ours) count as zero.
    pub fn evaluate(updated_at: Option<DateTime<Utc>>, ttl_secs: u64, now: DateTime<Utc>) -> Self {
        let Some(updated_at) = updated_at else {
            return Self::dead();
        };

        let age_ms = now.signed_duration_since(updated_at).num_milliseconds().max(0);
        let age_secs = age_ms as f64 / 1000.0;

        Self {
            status: classify(age_secs, ttl_secs),
            age_secs: Some(age_secs),
        }
    }
}

/// Bucket an age against a TTL. Both boundaries land in the worse bucket.
pub fn classify(age_secs: f64, ttl_secs: u64) -> FreshnessStatus {
    let ttl = ttl_secs as f64;
    if age_secs < ttl {
        FreshnessStatus::Fresh
    } else if age_secs < 2.0 * ttl {
        FreshnessStatus::Stale
    } else {
        FreshnessStatus::Dead
    }
}
