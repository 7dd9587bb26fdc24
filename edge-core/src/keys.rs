//! Snapshot keys published by the collector
//!
//! Keys follow `provider:dataset:scope`.

use crate::Asset;

pub const GLOBAL: &str = "coingecko:global";
pub const FEAR_GREED: &str = "altme:fear_greed";
pub const PAPER_ACCOUNTS: &str = "paper:accounts";
pub const PAPER_POSITIONS: &str = "paper:positions";
pub const PAPER_TRADES: &str = "paper:trades:30d";

/// Keys with this prefix are collector bookkeeping, not datasets
pub const COOLDOWN_PREFIX: &str = "_cooldown:";

pub fn price(asset: Asset) -> String {
    format!("coingecko:price_simple:usd:{}", asset.coingecko_id())
}

pub fn funding(asset: Asset) -> String {
    format!("coinglass:oi_weighted_funding:{}", asset.symbol())
}

pub fn open_interest(asset: Asset) -> String {
    format!("coinglass:open_interest:{}", asset.symbol())
}

pub fn liquidations(asset: Asset) -> String {
    format!("coinglass:liquidations:{}", asset.symbol())
}

/// Last regime label published for a ticker
pub fn regime_last(ticker: &str) -> String {
    format!("edge:regime:last:{}", ticker)
}

/// Last sentiment bucket published for a ticker
pub fn sentiment_last(ticker: &str) -> String {
    format!("edge:sentiment:last:{}", ticker)
}
