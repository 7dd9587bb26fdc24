//! Market overview tiles

use chrono::{DateTime, Utc};
use serde::Serialize;

use edge_core::{Asset, EdgeResult, KpiView, RESPONSE_VERSION};

use crate::resolver::{Resolver, SourceView};
use crate::signals::{self, LiquidationSplit};

/// One headline tile
#[derive(Debug, Clone, Serialize)]
pub struct Tile {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kpi: KpiView,
    /// Secondary line under the value
    pub sub: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketOverview {
    pub ts: DateTime<Utc>,
    pub version: &'static str,
    pub kpis: Vec<Tile>,
    pub sources: Vec<SourceView>,
}

/// Build the BTC-centric overview
pub fn build_market_overview(resolver: &Resolver<'_>) -> EdgeResult<MarketOverview> {
    let deps = signals::asset_dependencies(Asset::Btc)?;
    let resolved = resolver.resolve_all(&deps);

    let change = resolved.kpi(signals::CHANGE_24H);
    let oi_change = resolved.kpi(signals::OI_CHANGE_24H);
    let liqs = LiquidationSplit::from_resolved(&resolved);

    let liq_sub = match (liqs.long_pct.is_usable(), liqs.short_pct.is_usable()) {
        (false, false) => "long/short breakdown".to_string(),
        _ => format!(
            "{} long / {} short",
            liqs.long_pct.display_with(0),
            liqs.short_pct.display_with(0)
        ),
    };

    let kpis = vec![
        Tile {
            key: "btc_price",
            label: "BTC Price",
            kpi: resolved.kpi(signals::PRICE).view(),
            sub: format!("{} 24h", change.display()),
        },
        Tile {
            key: "funding_oiw",
            label: "Funding (OI-weighted)",
            kpi: resolved.kpi(signals::FUNDING).view_with(3),
            sub: "per 8h interval".to_string(),
        },
        Tile {
            key: "open_interest",
            label: "Open Interest",
            kpi: resolved.kpi(signals::OPEN_INTEREST).view(),
            sub: format!("{} 24h", oi_change.display()),
        },
        Tile {
            key: "liq_24h",
            label: "Liquidations (24h)",
            kpi: liqs.total.view(),
            sub: liq_sub,
        },
        Tile {
            key: "btc_dominance",
            label: "BTC Dominance",
            kpi: resolved.kpi(signals::BTC_DOMINANCE).view_with(1),
            sub: "share of total market cap".to_string(),
        },
    ];

    Ok(MarketOverview {
        ts: resolver.now(),
        version: RESPONSE_VERSION,
        kpis,
        sources: resolved.source_views(),
    })
}
