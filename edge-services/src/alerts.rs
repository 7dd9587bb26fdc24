//! Live alerts ticker
//!
//! Compares the current regime label and sentiment bucket against the last
//! state the collector published under `edge:regime:last:*` and
//! `edge:sentiment:last:*`. A differing usable baseline yields a change
//! item. With no change items a state tape is emitted instead, so the ticker
//! is never empty. Nothing here writes to the store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use edge_core::format::PLACEHOLDER;
use edge_core::{keys, EdgeResult, Facts, RESPONSE_VERSION};

use crate::config::EdgeConfig;
use crate::regime::build_regime;
use crate::resolver::{Resolver, SourceView};

const BADGE_UP: &str = "\u{1f7e2}";
const BADGE_WATCH: &str = "\u{1f7e1}";
const BADGE_STATE: &str = "\u{1f4ca}";
const BADGE_SENTIMENT: &str = "\u{1f9ed}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    RegimeChange,
    SentimentShift,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Intelhub,
    Market,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertItem {
    pub ts: DateTime<Utc>,
    pub category: AlertCategory,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub asset: String,
    pub from: String,
    pub to: String,
    pub score: Option<u32>,
    pub confidence: String,
    pub badge: &'static str,
    pub headline: String,
    pub message: String,
    pub cta: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertsFeed {
    pub ts: DateTime<Utc>,
    pub version: &'static str,
    /// Newest first
    pub items: Vec<AlertItem>,
    pub sources: Vec<SourceView>,
}

/// The current regime and sentiment state shared by every item
struct Current<'a> {
    now: DateTime<Utc>,
    regime: &'a str,
    confidence: &'a str,
    bucket: &'a str,
    score: Option<u32>,
}

impl Current<'_> {
    fn item(
        &self,
        kind: AlertKind,
        category: AlertCategory,
        asset: &str,
        from: &str,
    ) -> AlertItem {
        let (to, confidence, score) = match category {
            AlertCategory::Intelhub => (self.regime, self.confidence, None),
            AlertCategory::Market => (self.bucket, "high", self.score),
        };
        let score_note = score.map(|s| format!(" (Score: {})", s)).unwrap_or_default();

        let (badge, headline, message) = match (kind, category) {
            (AlertKind::RegimeChange, _) => (
                regime_badge(to),
                format!("{} REGIME CHANGE", asset),
                format!("{} → {}", from, to),
            ),
            (AlertKind::SentimentShift, _) => (
                BADGE_SENTIMENT,
                format!("SENTIMENT SHIFT | {}", asset),
                format!("{} → {}{}", from, to, score_note),
            ),
            (AlertKind::State, AlertCategory::Intelhub) => (
                BADGE_STATE,
                format!("{} REGIME", asset),
                format!("{} ({})", to, confidence.to_uppercase()),
            ),
            (AlertKind::State, AlertCategory::Market) => (
                BADGE_SENTIMENT,
                format!("SENTIMENT | {}", asset),
                format!("{}{}", to, score_note),
            ),
        };

        AlertItem {
            ts: self.now,
            category,
            kind,
            asset: asset.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            score,
            confidence: confidence.to_string(),
            badge,
            headline,
            message,
            cta: "/start",
        }
    }
}

fn regime_badge(label: &str) -> &'static str {
    let upper = label.to_uppercase();
    if upper.contains("ACCUM") || upper.contains("ON") {
        BADGE_UP
    } else {
        BADGE_WATCH
    }
}

/// Usable string field of the last published state
fn baseline(resolver: &Resolver<'_>, key: &str, field: &str) -> (Option<String>, SourceView) {
    let source = resolver.fetch(key);
    let value = source
        .usable_payload()
        .and_then(|payload| payload.get(field))
        .and_then(Value::as_str)
        .map(str::to_string);
    (value, source.view())
}

/// Build the ticker
///
/// `fear_greed` is the current index value, `None` when no reading was
/// available. `limit` is clamped to the configured maximum.
pub fn build_alerts_live(
    resolver: &Resolver<'_>,
    config: &EdgeConfig,
    fear_greed: Option<u32>,
    limit: Option<usize>,
) -> EdgeResult<AlertsFeed> {
    let policy = &config.alerts;
    let limit = limit
        .unwrap_or(policy.default_limit)
        .clamp(1, policy.max_limit.max(1));

    let regime = build_regime(resolver, &config.regime)?;
    let facts = Facts::new().metric("fear_greed", fear_greed.map(f64::from));
    let bucket = policy.sentiment.evaluate(&facts);

    let current = Current {
        now: resolver.now(),
        regime: &regime.regime.label,
        confidence: regime.regime.confidence,
        bucket,
        score: fear_greed,
    };

    let mut sources = regime.sources.clone();
    let mut items = Vec::new();

    for asset in &policy.regime_assets {
        let (prev, view) = baseline(resolver, &keys::regime_last(asset), "label");
        sources.push(view);
        if let Some(prev) = prev.filter(|prev| prev != current.regime) {
            items.push(current.item(
                AlertKind::RegimeChange,
                AlertCategory::Intelhub,
                asset,
                &prev,
            ));
        }
    }

    for asset in &policy.sentiment_assets {
        let (prev, view) = baseline(resolver, &keys::sentiment_last(asset), "bucket");
        sources.push(view);
        if let Some(prev) = prev.filter(|prev| prev != current.bucket) {
            items.push(current.item(
                AlertKind::SentimentShift,
                AlertCategory::Market,
                asset,
                &prev,
            ));
        }
    }

    if items.is_empty() {
        let state = |category, asset: &String| {
            current.item(AlertKind::State, category, asset, PLACEHOLDER)
        };
        items.extend(
            policy
                .regime_assets
                .iter()
                .map(|asset| state(AlertCategory::Intelhub, asset)),
        );
        items.extend(
            policy
                .sentiment_assets
                .iter()
                .map(|asset| state(AlertCategory::Market, asset)),
        );
    }

    items.reverse();
    items.truncate(limit);

    Ok(AlertsFeed {
        ts: current.now,
        version: RESPONSE_VERSION,
        items,
        sources,
    })
}
