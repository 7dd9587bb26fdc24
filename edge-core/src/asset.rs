//! Asset definitions for per-asset widgets

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EdgeError;

/// Assets the collector publishes per-asset snapshots for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// Bitcoin
    Btc,
    /// Ethereum
    Eth,
}

impl Asset {
    /// Ticker symbol, as used in CoinGlass keys
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Btc => "BTC",
            Asset::Eth => "ETH",
        }
    }

    /// CoinGecko coin id, as used in price keys
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Asset::Btc => "bitcoin",
            Asset::Eth => "ethereum",
        }
    }

    /// Path of this asset's dominance share inside the `coingecko:global` payload
    pub fn dominance_path(&self) -> &'static str {
        match self {
            Asset::Btc => "data.btc_dominance",
            Asset::Eth => "data.eth_dominance",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Asset {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BTC" | "BITCOIN" => Ok(Asset::Btc),
            "ETH" | "ETHEREUM" => Ok(Asset::Eth),
            _ => Err(EdgeError::unsupported_asset(s)),
        }
    }
}
