//! SuperCard: six interpretive pillars per asset
//!
//! Each pillar shows a short value line and a status from its band.
//! Stance comes from the configured rule table; confidence from how many
//! pillars had data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use edge_core::format::PLACEHOLDER;
use edge_core::{Asset, Band, BandLevel, EdgeResult, Facts, RESPONSE_VERSION};

use crate::config::ScorecardPolicy;
use crate::resolver::{Resolver, SourceView};
use crate::signals::{self, LiquidationSplit};

const DISCLAIMER: &str = "Interpretation signals derived from live snapshots. \
     Values are intentionally high-level (no methodology disclosed).";

/// Pillar reading relative to its band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarStatus {
    Positive,
    Neutral,
    Negative,
}

impl PillarStatus {
    fn from_band(band: &Band, value: Option<f64>) -> Self {
        match band.classify(value) {
            BandLevel::High => PillarStatus::Positive,
            BandLevel::Low => PillarStatus::Negative,
            BandLevel::Mid => PillarStatus::Neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pillar {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub status: PillarStatus,
    pub hint: &'static str,
}

impl Pillar {
    /// Whether the pillar had any data behind it
    pub fn has_data(&self) -> bool {
        self.value != PLACEHOLDER
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub headline: String,
    pub stance: String,
    pub confidence: &'static str,
    /// Always three entries
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuperCard {
    pub ts: DateTime<Utc>,
    pub version: &'static str,
    pub symbol: Asset,
    pub summary: Summary,
    pub pillars: Vec<Pillar>,
    pub disclaimer: &'static str,
    pub sources: Vec<SourceView>,
}

fn line(has_data: bool, render: impl FnOnce() -> String) -> String {
    if has_data {
        render()
    } else {
        PLACEHOLDER.to_string()
    }
}

pub fn build_supercard(
    resolver: &Resolver<'_>,
    policy: &ScorecardPolicy,
    asset: Asset,
) -> EdgeResult<SuperCard> {
    let mut deps = signals::asset_dependencies(asset)?;
    deps.push(signals::fear_greed_dependency()?);
    let resolved = resolver.resolve_all(&deps);

    let price = resolved.kpi(signals::PRICE);
    let change = resolved.kpi(signals::CHANGE_24H);
    let funding = resolved.kpi(signals::FUNDING);
    let oi = resolved.kpi(signals::OPEN_INTEREST);
    let oi_change = resolved.kpi(signals::OI_CHANGE_24H);
    let btc_dom = resolved.kpi(signals::BTC_DOMINANCE);
    let total_vol = resolved.kpi(signals::TOTAL_VOLUME);
    let fear_greed = resolved.kpi(signals::FEAR_GREED);
    let liqs = LiquidationSplit::from_resolved(&resolved);
    let fg_label = signals::fear_greed_label(&resolved)?;

    let flow = Pillar {
        key: "flow",
        label: "Flow",
        value: line(liqs.total.is_usable() || total_vol.is_usable(), || {
            format!("{} liqs / {} vol", liqs.total.display(), total_vol.display())
        }),
        status: PillarStatus::from_band(&policy.flow, liqs.total.usable()),
        hint: "pressure proxy (liqs/volume)",
    };

    let leverage = Pillar {
        key: "leverage",
        label: "Leverage",
        value: line(oi.is_usable() || funding.is_usable(), || {
            format!("{} OI • {} funding", oi.display(), funding.display_with(3))
        }),
        status: PillarStatus::from_band(&policy.leverage, funding.usable()),
        hint: "OI + funding stress",
    };

    let fragility = Pillar {
        key: "fragility",
        label: "Fragility",
        value: line(liqs.long_pct.is_usable() && liqs.short_pct.is_usable(), || {
            format!(
                "{} long / {} short",
                liqs.long_pct.display_with(0),
                liqs.short_pct.display_with(0)
            )
        }),
        status: PillarStatus::from_band(&policy.fragility, liqs.long_pct.usable()),
        hint: "liq imbalance + spikes",
    };

    let momentum = Pillar {
        key: "momentum",
        label: "Momentum",
        value: line(price.is_usable() || change.is_usable(), || {
            format!("{} • {} 24h", price.display(), change.display())
        }),
        status: PillarStatus::from_band(&policy.momentum, change.usable()),
        hint: "trend + volatility",
    };

    let sentiment = Pillar {
        key: "sentiment",
        label: "Sentiment",
        value: match (fear_greed.usable(), &fg_label) {
            (Some(v), Some(label)) => format!("{} — {}", v, label),
            (Some(v), None) => format!("{}", v),
            (None, _) => PLACEHOLDER.to_string(),
        },
        status: PillarStatus::from_band(&policy.sentiment, fear_greed.usable()),
        hint: "fear/greed index",
    };

    let risk = Pillar {
        key: "risk",
        label: "Risk",
        value: line(oi_change.is_usable() || btc_dom.is_usable(), || {
            format!("OI {} • BTC dom {}", oi_change.display(), btc_dom.display_with(1))
        }),
        status: PillarStatus::from_band(&policy.risk, oi_change.usable()),
        hint: "regime + confidence",
    };

    let pillars = vec![flow, leverage, fragility, momentum, sentiment, risk];
    let parts_ok = pillars.iter().filter(|p| p.has_data()).count();

    let facts = Facts::new()
        .metric("change_24h", change.usable())
        .metric("fear_greed", fear_greed.usable())
        .metric("funding_pct", funding.usable())
        .metric("liq_long_pct", liqs.long_pct.usable());
    let stance = policy.stance.evaluate(&facts).clone();

    let mut notes: Vec<String> = [
        (funding.is_usable(), "Funding reflects positioning pressure (crowding proxy)."),
        (liqs.total.is_usable(), "Liquidations help gauge fragility and forced flow."),
        (fear_greed.is_usable(), "Sentiment adds a behavioral context layer."),
    ]
    .into_iter()
    .filter(|(present, _)| *present)
    .map(|(_, note)| note.to_string())
    .collect();
    notes.resize(3, PLACEHOLDER.to_string());

    Ok(SuperCard {
        ts: resolver.now(),
        version: RESPONSE_VERSION,
        symbol: asset,
        summary: Summary {
            headline: format!("{} SuperCard", asset),
            stance,
            confidence: policy.confidence.label(parts_ok),
            notes,
        },
        pillars,
        disclaimer: DISCLAIMER,
        sources: resolved.source_views(),
    })
}
