//! Heuristic market regime classifier
//!
//! Four axes are bucketed from BTC signals, then combined by the configured
//! rule table into a single label. A missing driver puts its axis in the
//! middle bucket and shows the placeholder.

use chrono::{DateTime, Utc};
use serde::Serialize;

use edge_core::format::{fmt_pct, fmt_usd, PLACEHOLDER};
use edge_core::{Asset, EdgeResult, Facts, RESPONSE_VERSION};

use crate::config::{AxisPolicy, RegimePolicy};
use crate::resolver::{Resolver, SourceView};
use crate::signals::{self, LiquidationSplit};

const DISCLAIMER: &str = "Heuristic regime classifier derived from live snapshots. \
     Outputs are buckets and drivers (no model disclosure).";

#[derive(Debug, Clone, Serialize)]
pub struct RegimeLabel {
    pub label: String,
    pub confidence: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    /// Bucket key the rules saw
    pub bucket: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Regime {
    pub ts: DateTime<Utc>,
    pub version: &'static str,
    pub regime: RegimeLabel,
    pub axes: Vec<Axis>,
    /// Always three entries
    pub drivers: Vec<String>,
    pub disclaimer: &'static str,
    pub sources: Vec<SourceView>,
}

fn axis(key: &'static str, label: &'static str, policy: &AxisPolicy, driver: Option<f64>) -> Axis {
    let bucket = policy.classify(driver);
    Axis {
        key,
        label,
        value: match driver {
            Some(_) => bucket.label.clone(),
            None => PLACEHOLDER.to_string(),
        },
        bucket: bucket.key.clone(),
    }
}

pub fn build_regime(resolver: &Resolver<'_>, policy: &RegimePolicy) -> EdgeResult<Regime> {
    let mut deps = signals::asset_dependencies(Asset::Btc)?;
    deps.push(signals::fear_greed_dependency()?);
    let resolved = resolver.resolve_all(&deps);

    let price = resolved.usable(signals::PRICE);
    let change = resolved.usable(signals::CHANGE_24H);
    let funding = resolved.usable(signals::FUNDING);
    let fear_greed = resolved.usable(signals::FEAR_GREED);
    let liqs = LiquidationSplit::from_resolved(&resolved);
    let liq_total = liqs.total.usable();
    let liq_long = liqs.long_pct.usable();

    let axes = vec![
        axis("trend", "Trend", &policy.trend, change),
        axis("volatility", "Volatility", &policy.volatility, liq_total),
        axis("leverage", "Leverage", &policy.leverage, funding),
        axis("liquidity", "Liquidity", &policy.liquidity, liq_long),
    ];

    let facts = axes
        .iter()
        .fold(Facts::new(), |facts, axis| facts.label(axis.key, axis.bucket.as_str()))
        .metric("fear_greed", fear_greed);
    let label = policy.rules.evaluate(&facts).clone();

    let parts_ok = resolved.usable_count(&[
        signals::CHANGE_24H,
        signals::FUNDING,
        signals::OI_CHANGE_24H,
    ]) + usize::from(liq_total.is_some());

    let mut drivers = Vec::with_capacity(4);
    if let (Some(price), Some(change)) = (price, change) {
        drivers.push(format!(
            "BTC {} • {} 24h (trend axis)",
            fmt_usd(Some(price)),
            fmt_pct(Some(change), 2, true)
        ));
    }
    if let Some(funding) = funding {
        drivers.push(format!(
            "Funding {} (crowding proxy)",
            fmt_pct(Some(funding), 3, true)
        ));
    }
    if let (Some(total), Some(long)) = (liq_total, liq_long) {
        drivers.push(format!(
            "Liqs {} • {} long (fragility proxy)",
            fmt_usd(Some(total)),
            fmt_pct(Some(long), 0, false)
        ));
    }
    if let Some(fg) = fear_greed {
        drivers.push(format!("Fear & Greed {} (sentiment context)", fg));
    }
    drivers.resize(3, PLACEHOLDER.to_string());

    Ok(Regime {
        ts: resolver.now(),
        version: RESPONSE_VERSION,
        regime: RegimeLabel {
            label,
            confidence: policy.confidence.label(parts_ok),
        },
        axes,
        drivers,
        disclaimer: DISCLAIMER,
        sources: resolved.source_views(),
    })
}
