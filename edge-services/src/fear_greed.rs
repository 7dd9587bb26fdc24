//! Fear & Greed feed with a database-backed cache
//!
//! A cached copy younger than `max_age_secs` is served without a network
//! call. Otherwise the provider is asked, with a bounded timeout; a valid
//! answer replaces the cache. When the provider fails the cache is served
//! whatever its age, and with no cache at all a neutral reading is served.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use edge_altme::{
    validate, AltmeError, FearGreedIndex, FearGreedReading, FearGreedSource, HistoryPoint,
};
use edge_core::{keys, Freshness, FreshnessStatus, Snapshot, RESPONSE_VERSION};

use crate::config::EdgeConfig;
use crate::store::SnapshotStore;

/// Where the served reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOutcome {
    /// Fetched from the provider during this request
    Live,
    /// Served from the stored copy
    Cached,
    /// Nothing available; neutral placeholder
    Default,
}

/// Result of one feed resolution
#[derive(Debug, Clone)]
pub struct FeedResult {
    pub outcome: FeedOutcome,
    pub index: FearGreedIndex,
    pub updated_at: Option<DateTime<Utc>>,
    pub freshness: Option<Freshness>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedSource {
    pub provider: String,
    pub dataset_key: &'static str,
    pub outcome: FeedOutcome,
    pub updated_at: Option<DateTime<Utc>>,
    pub status: FreshnessStatus,
    pub age_s: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FearGreedResponse {
    pub ts: DateTime<Utc>,
    pub version: &'static str,
    pub current: FearGreedReading,
    pub history: Vec<HistoryPoint>,
    pub source: FeedSource,
}

impl FeedResult {
    pub fn into_response(self, provider: &str, now: DateTime<Utc>) -> FearGreedResponse {
        FearGreedResponse {
            ts: now,
            version: RESPONSE_VERSION,
            current: self.index.current,
            history: self.index.history,
            source: FeedSource {
                provider: provider.to_string(),
                dataset_key: keys::FEAR_GREED,
                outcome: self.outcome,
                updated_at: self.updated_at,
                status: self
                    .freshness
                    .map(|f| f.status)
                    .unwrap_or(FreshnessStatus::Dead),
                age_s: self.freshness.and_then(|f| f.age_secs),
            },
        }
    }
}

fn read_cache(store: &dyn SnapshotStore) -> Option<Snapshot> {
    match store.read(keys::FEAR_GREED) {
        Ok(Some(snapshot)) => match validate(&snapshot.payload) {
            Ok(()) => Some(snapshot),
            Err(e) => {
                warn!("Ignoring cached Fear & Greed payload: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Fear & Greed cache read failed: {}", e);
            None
        }
    }
}

async fn fetch_live(source: &dyn FearGreedSource, timeout_ms: u64) -> Result<Value, AltmeError> {
    let raw = tokio::time::timeout(Duration::from_millis(timeout_ms), source.fetch_raw())
        .await
        .map_err(|_| AltmeError::Timeout(timeout_ms))??;
    validate(&raw)?;
    Ok(raw)
}

/// Resolve the feed: fresh cache, else live, else any cache, else neutral
pub async fn resolve_fear_greed(
    store: &dyn SnapshotStore,
    source: &dyn FearGreedSource,
    config: &EdgeConfig,
    now: DateTime<Utc>,
) -> FeedResult {
    let feed = &config.feed;
    let ttl_secs = config.ttl.ttl_for(keys::FEAR_GREED);
    let cached = read_cache(store);

    if let Some(snapshot) = &cached {
        let freshness = Freshness::evaluate(snapshot.updated_at, ttl_secs, now);
        let young = snapshot.updated_at.is_some()
            && freshness
                .age_secs
                .is_some_and(|age| age < feed.max_age_secs as f64);
        if young {
            debug!("Serving Fear & Greed from cache (age {:?}s)", freshness.age_secs);
            return FeedResult {
                outcome: FeedOutcome::Cached,
                index: FearGreedIndex::from_payload(&snapshot.payload, feed.history_len),
                updated_at: snapshot.updated_at,
                freshness: Some(freshness),
            };
        }
    }

    match fetch_live(source, feed.timeout_ms).await {
        Ok(raw) => {
            if let Err(e) = store.upsert(keys::FEAR_GREED, &raw) {
                warn!("Failed to cache Fear & Greed response: {}", e);
            }
            info!("Refreshed Fear & Greed from {}", source.provider());
            FeedResult {
                outcome: FeedOutcome::Live,
                index: FearGreedIndex::from_payload(&raw, feed.history_len),
                updated_at: Some(now),
                freshness: Some(Freshness::evaluate(Some(now), ttl_secs, now)),
            }
        }
        Err(e) => {
            warn!("Fear & Greed provider fetch failed: {}", e);
            match cached {
                Some(snapshot) => FeedResult {
                    outcome: FeedOutcome::Cached,
                    index: FearGreedIndex::from_payload(&snapshot.payload, feed.history_len),
                    updated_at: snapshot.updated_at,
                    freshness: Some(Freshness::evaluate(snapshot.updated_at, ttl_secs, now)),
                },
                None => FeedResult {
                    outcome: FeedOutcome::Default,
                    index: FearGreedIndex::neutral(),
                    updated_at: None,
                    freshness: None,
                },
            }
        }
    }
}
