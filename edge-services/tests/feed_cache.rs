//! Fear & Greed cache strategy against an in-memory store and a scripted provider.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use edge_altme::{AltmeError, FearGreedSource};
use edge_core::{keys, FreshnessStatus};
use edge_services::{
    resolve_fear_greed, EdgeConfig, FeedOutcome, SnapshotStore, SqliteSnapshotStore,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

enum Script {
    Ok(Value),
    Fail,
    Hang,
}

struct MockSource {
    script: Script,
    calls: AtomicUsize,
}

impl MockSource {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FearGreedSource for MockSource {
    async fn fetch_raw(&self) -> Result<Value, AltmeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Ok(raw) => Ok(raw.clone()),
            Script::Fail => Err(AltmeError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
            Script::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Ok(live_payload())
            }
        }
    }

    fn provider(&self) -> &str {
        "mock"
    }
}

fn cached_payload() -> Value {
    json!({"data": [{"value": "30", "value_classification": "Fear", "timestamp": "1767225600"}]})
}

fn live_payload() -> Value {
    json!({"data": [{"value": "72", "value_classification": "Greed", "timestamp": "1767312000"}]})
}

fn seeded_store(age_secs: i64) -> SqliteSnapshotStore {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    store
        .put_at(
            keys::FEAR_GREED,
            &cached_payload(),
            Some(Utc::now() - Duration::seconds(age_secs)),
        )
        .unwrap();
    store
}

#[tokio::test]
async fn test_young_cache_skips_provider() {
    let store = seeded_store(10);
    let source = MockSource::new(Script::Ok(live_payload()));

    let result = resolve_fear_greed(&store, &source, &EdgeConfig::default(), Utc::now()).await;

    assert_eq!(source.calls(), 0);
    assert_eq!(result.outcome, FeedOutcome::Cached);
    assert_eq!(result.index.current.value, 30);
}

#[tokio::test]
async fn test_old_cache_refreshes_from_provider() {
    let store = seeded_store(1_000);
    let source = MockSource::new(Script::Ok(live_payload()));

    let result = resolve_fear_greed(&store, &source, &EdgeConfig::default(), Utc::now()).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(result.outcome, FeedOutcome::Live);
    assert_eq!(result.index.current.value, 72);
    assert_eq!(result.index.current.label, "Greed");
    assert_eq!(result.freshness.unwrap().status, FreshnessStatus::Fresh);

    let stored = store.read(keys::FEAR_GREED).unwrap().unwrap();
    assert_eq!(stored.payload, live_payload());

    // The refreshed copy is young, so the next request stays local.
    let again = resolve_fear_greed(&store, &source, &EdgeConfig::default(), Utc::now()).await;
    assert_eq!(source.calls(), 1);
    assert_eq!(again.outcome, FeedOutcome::Cached);
}

#[tokio::test]
async fn test_provider_failure_serves_old_cache() {
    let store = seeded_store(10_000);
    let source = MockSource::new(Script::Fail);

    let result = resolve_fear_greed(&store, &source, &EdgeConfig::default(), Utc::now()).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(result.outcome, FeedOutcome::Cached);
    assert_eq!(result.index.current.value, 30);
    // 10000s against the 1800s TTL of the feed key
    assert_eq!(result.freshness.unwrap().status, FreshnessStatus::Dead);
}

#[tokio::test]
async fn test_provider_failure_without_cache_is_neutral() {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    let source = MockSource::new(Script::Fail);

    let now = Utc::now();
    let result = resolve_fear_greed(&store, &source, &EdgeConfig::default(), now).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(result.outcome, FeedOutcome::Default);
    assert_eq!(result.index.current.value, 50);
    assert_eq!(result.index.current.label, "Neutral");
    assert!(result.index.history.is_empty());

    let response = result.into_response(source.provider(), now);
    assert_eq!(response.source.status, FreshnessStatus::Dead);
    assert!(store.read(keys::FEAR_GREED).unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_live_shape_keeps_cache() {
    let store = seeded_store(1_000);
    let source = MockSource::new(Script::Ok(json!({"data": []})));

    let result = resolve_fear_greed(&store, &source, &EdgeConfig::default(), Utc::now()).await;

    assert_eq!(result.outcome, FeedOutcome::Cached);
    let stored = store.read(keys::FEAR_GREED).unwrap().unwrap();
    assert_eq!(stored.payload, cached_payload());
}

#[tokio::test]
async fn test_provider_timeout_is_a_failure() {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    let source = MockSource::new(Script::Hang);
    let mut config = EdgeConfig::default();
    config.feed.timeout_ms = 50;

    let result = resolve_fear_greed(&store, &source, &config, Utc::now()).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(result.outcome, FeedOutcome::Default);
}

#[tokio::test]
async fn test_response_carries_outcome_and_history() {
    let store = seeded_store(10);
    let source = MockSource::new(Script::Fail);
    let now = Utc::now();

    let response = resolve_fear_greed(&store, &source, &EdgeConfig::default(), now)
        .await
        .into_response(source.provider(), now);

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["version"], "v0.2-live");
    assert_eq!(body["source"]["outcome"], "cached");
    assert_eq!(body["source"]["dataset_key"], "altme:fear_greed");
    assert_eq!(body["history"][0]["t"], "Jan 01");
    assert_eq!(body["current"]["value"], 30);
}
