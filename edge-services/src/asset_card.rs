//! Per-asset card

use chrono::{DateTime, Utc};
use serde::Serialize;

use edge_core::{Asset, EdgeResult, KpiView, RESPONSE_VERSION};

use crate::resolver::{Resolver, SourceView};
use crate::signals::{self, LiquidationSplit};

/// Card fields; each one is always present
#[derive(Debug, Clone, Serialize)]
pub struct CardFields {
    pub price: KpiView,
    pub change_24h: KpiView,
    pub dominance: KpiView,
    pub vol_24h: KpiView,
    pub funding: KpiView,
    pub open_interest: KpiView,
    pub liquidations_24h: KpiView,
    pub liq_long_pct: KpiView,
    pub liq_short_pct: KpiView,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetCard {
    pub ts: DateTime<Utc>,
    pub version: &'static str,
    pub symbol: Asset,
    pub card: CardFields,
    pub sources: Vec<SourceView>,
}

pub fn build_asset_card(resolver: &Resolver<'_>, asset: Asset) -> EdgeResult<AssetCard> {
    let deps = signals::asset_dependencies(asset)?;
    let resolved = resolver.resolve_all(&deps);
    let liqs = LiquidationSplit::from_resolved(&resolved);

    let card = CardFields {
        price: resolved.kpi(signals::PRICE).view(),
        change_24h: resolved.kpi(signals::CHANGE_24H).view(),
        dominance: resolved.kpi(signals::DOMINANCE).view_with(1),
        vol_24h: resolved.kpi(signals::VOL_24H).view(),
        funding: resolved.kpi(signals::FUNDING).view_with(3),
        open_interest: resolved.kpi(signals::OPEN_INTEREST).view(),
        liquidations_24h: liqs.total.view(),
        liq_long_pct: liqs.long_pct.view_with(0),
        liq_short_pct: liqs.short_pct.view_with(0),
    };

    Ok(AssetCard {
        ts: resolver.now(),
        version: RESPONSE_VERSION,
        symbol: asset,
        card,
        sources: resolved.source_views(),
    })
}
