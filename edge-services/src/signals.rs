//! Market signal dependencies shared by the per-asset builders
//!
//! Field paths follow the payload shapes the collector writes:
//!
//! - `coingecko:price_simple:usd:{id}`: `{"data": {"price", "change_24h", "vol_24h"}}`
//! - `coinglass:oi_weighted_funding:{SYM}`: `{"data": {"rate"}}`, rate as a fraction
//! - `coinglass:open_interest:{SYM}`: `{"data": {"oi_usd", "oi_change_24h"}}`
//! - `coinglass:liquidations:{SYM}`: `{"raw": [{"exchange": "All", "liquidation_usd", ...}]}`
//! - `coingecko:global`: `{"data": {"btc_dominance", "total_volume_usd", ...}}`
//! - `altme:fear_greed`: `{"data": [{"value", "value_classification"}]}`

use edge_core::{keys, Asset, EdgeResult, FieldSpec, KpiKind, KpiValue, PathExpr};

use crate::resolver::{Dependency, Resolved};

pub const PRICE: &str = "price";
pub const CHANGE_24H: &str = "change_24h";
pub const VOL_24H: &str = "vol_24h";
pub const FUNDING: &str = "funding";
pub const OPEN_INTEREST: &str = "open_interest";
pub const OI_CHANGE_24H: &str = "oi_change_24h";
pub const LIQ_TOTAL: &str = "liq_total";
pub const LIQ_LONG: &str = "liq_long";
pub const LIQ_SHORT: &str = "liq_short";
pub const DOMINANCE: &str = "dominance";
pub const BTC_DOMINANCE: &str = "btc_dominance";
pub const TOTAL_VOLUME: &str = "total_volume";
pub const FEAR_GREED: &str = "fear_greed";

/// Path of the fear & greed classification label
pub const FEAR_GREED_LABEL_PATH: &str = "data[0].value_classification";

/// Liquidation field, from the `All` row or else the first row
fn liquidation_field(name: &str) -> EdgeResult<FieldSpec> {
    FieldSpec::parse(&format!("raw[exchange=All].{}", name), KpiKind::Amount)?
        .with_fallback(&format!("raw[0].{}", name))
}

/// Every per-asset input
pub fn asset_dependencies(asset: Asset) -> EdgeResult<Vec<Dependency>> {
    let price = keys::price(asset);
    let funding = keys::funding(asset);
    let oi = keys::open_interest(asset);
    let liqs = keys::liquidations(asset);

    Ok(vec![
        Dependency::new(PRICE, &price, "data.price", KpiKind::Amount)?,
        Dependency::new(CHANGE_24H, &price, "data.change_24h", KpiKind::Percent)?,
        Dependency::with_field(
            VOL_24H,
            &price,
            FieldSpec::parse("data.vol_24h", KpiKind::Amount)?.with_fallback("data.usd_24h_vol")?,
        ),
        Dependency::with_field(
            FUNDING,
            funding,
            FieldSpec::parse("data.rate", KpiKind::Percent)?.scaled(100.0),
        ),
        Dependency::new(OPEN_INTEREST, &oi, "data.oi_usd", KpiKind::Amount)?,
        Dependency::new(OI_CHANGE_24H, &oi, "data.oi_change_24h", KpiKind::Percent)?,
        Dependency::with_field(LIQ_TOTAL, &liqs, liquidation_field("liquidation_usd")?),
        Dependency::with_field(LIQ_LONG, &liqs, liquidation_field("longLiquidation_usd")?),
        Dependency::with_field(LIQ_SHORT, &liqs, liquidation_field("shortLiquidation_usd")?),
        Dependency::with_field(
            DOMINANCE,
            keys::GLOBAL,
            FieldSpec::parse(asset.dominance_path(), KpiKind::Percent)?.unsigned(),
        ),
        Dependency::with_field(
            BTC_DOMINANCE,
            keys::GLOBAL,
            FieldSpec::parse(Asset::Btc.dominance_path(), KpiKind::Percent)?.unsigned(),
        ),
        Dependency::new(TOTAL_VOLUME, keys::GLOBAL, "data.total_volume_usd", KpiKind::Amount)?,
    ])
}

pub fn fear_greed_dependency() -> EdgeResult<Dependency> {
    Dependency::new(FEAR_GREED, keys::FEAR_GREED, "data[0].value", KpiKind::Count)
}

/// Current fear & greed classification, if its snapshot is usable
pub fn fear_greed_label(resolved: &Resolved) -> EdgeResult<Option<String>> {
    let path = PathExpr::parse(FEAR_GREED_LABEL_PATH)?;
    Ok(resolved.text(keys::FEAR_GREED, &path))
}

/// Long/short shares of the liquidation total
#[derive(Debug, Clone, Copy)]
pub struct LiquidationSplit {
    pub total: KpiValue,
    pub long_pct: KpiValue,
    pub short_pct: KpiValue,
}

impl LiquidationSplit {
    pub fn from_resolved(resolved: &Resolved) -> Self {
        let total = resolved.kpi(LIQ_TOTAL);
        let long = resolved.kpi(LIQ_LONG);
        let short = resolved.kpi(LIQ_SHORT);

        Self {
            total,
            long_pct: share(&total, &long),
            short_pct: share(&total, &short),
        }
    }
}

fn share(total: &KpiValue, part: &KpiValue) -> KpiValue {
    let value = match (total.value, part.value) {
        (Some(t), Some(p)) if t != 0.0 => Some((p / t * 100.0).abs()),
        _ => None,
    };
    KpiValue::derived(KpiKind::Percent, value, false, &[total, part])
}
