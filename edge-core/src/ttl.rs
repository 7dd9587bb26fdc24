//! Per-key TTL policy
//!
//! Maps key prefixes to the collector's expected refresh interval.
//! The longest matching prefix wins; unmatched keys use the default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// TTL applied to keys without a matching prefix (5 minutes)
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Where a resolved TTL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtlSource {
    Policy,
    Default,
}

/// Key-prefix to refresh-interval table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlPolicy {
    /// Fallback TTL in seconds
    pub default_secs: u64,
    /// Prefix -> TTL in seconds
    pub prefixes: BTreeMap<String, u64>,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        let prefixes = [
            // CoinGecko
            ("coingecko:global", 360),
            ("coingecko:price_simple", 360),
            // CoinGlass
            ("coinglass:liquidations", 300),
            ("coinglass:funding_rate", 300),
            ("coinglass:open_interest", 300),
            ("coinglass:long_short_ratio", 300),
            ("coinglass:top_trader_sentiment", 600),
            ("coinglass:oi_weighted_funding", 1800),
            ("coinglass:coinbase_premium", 300),
            ("coinglass:exchange_rank", 900),
            ("coinglass:bubble_index", 3600),
            ("coinglass:bull_market_peak", 3600),
            ("coinglass:pi_cycle", 3600),
            // SoSoValue
            ("sosovalue:etf_flow", 3600),
            // DefiLlama
            ("defillama:chains", 900),
            ("defillama:global_tvl", 300),
            ("defillama:protocol", 900),
            // Prediction markets
            ("polymarket:active_markets", 900),
            ("kalshi:macro_markets", 900),
            ("kalshi:crypto_markets", 900),
            // Etherscan
            ("etherscan:gas_oracle", 120),
            ("etherscan:balance", 600),
            // Alternative.me
            ("altme:fear_greed", 1800),
            // Internal rollups
            ("edge:regime", 300),
            ("edge:sentiment", 300),
            ("paper:", 900),
        ]
        .into_iter()
        .map(|(prefix, secs)| (prefix.to_string(), secs))
        .collect();

        Self {
            default_secs: DEFAULT_TTL_SECS,
            prefixes,
        }
    }
}

impl TtlPolicy {
    /// A policy with no prefixes, only a default
    pub fn with_default(default_secs: u64) -> Self {
        Self {
            default_secs,
            prefixes: BTreeMap::new(),
        }
    }

    /// Add or replace a prefix entry
    pub fn insert(&mut self, prefix: impl Into<String>, secs: u64) {
        self.prefixes.insert(prefix.into(), secs);
    }

    /// Resolve the TTL for a key and report where it came from
    pub fn lookup(&self, key: &str) -> (u64, TtlSource) {
        self.prefixes
            .iter()
            .filter(|(prefix, _)| key.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, secs)| (*secs, TtlSource::Policy))
            .unwrap_or((self.default_secs, TtlSource::Default))
    }

    /// TTL in seconds for a key
    pub fn ttl_for(&self, key: &str) -> u64 {
        self.lookup(key).0
    }

    /// Entries with a zero TTL, which can never be fresh
    pub fn zero_entries(&self) -> Vec<&str> {
        let mut zero: Vec<&str> = self
            .prefixes
            .iter()
            .filter(|(_, secs)| **secs == 0)
            .map(|(prefix, _)| prefix.as_str())
            .collect();
        if self.default_secs == 0 {
            zero.push("<default>");
        }
        zero
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_prefix_wins() {
        let mut policy = TtlPolicy::with_default(300);
        policy.insert("coinglass:", 600);
        policy.insert("coinglass:oi_weighted_funding", 1800);

        assert_eq!(
            policy.lookup("coinglass:oi_weighted_funding:BTC"),
            (1800, TtlSource::Policy)
        );
        assert_eq!(
            policy.lookup("coinglass:liquidations:BTC"),
            (600, TtlSource::Policy)
        );
    }

    #[test]
    fn test_unknown_key_uses_default() {
        let policy = TtlPolicy::default();
        assert_eq!(
            policy.lookup("nobody:publishes:this"),
            (DEFAULT_TTL_SECS, TtlSource::Default)
        );
        assert_eq!(policy.ttl_for("altme:fear_greed"), 1800);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let policy: TtlPolicy = serde_json::from_str(r#"{"default_secs": 120}"#).unwrap();
        assert_eq!(policy.default_secs, 120);
        assert_eq!(policy.prefixes, TtlPolicy::default().prefixes);

        let policy: TtlPolicy =
            serde_json::from_str(r#"{"prefixes": {"price:": 60}}"#).unwrap();
        assert_eq!(policy.default_secs, DEFAULT_TTL_SECS);
        assert_eq!(policy.ttl_for("price:X"), 60);
    }

    #[test]
    fn test_zero_entries() {
        let mut policy = TtlPolicy::with_default(0);
        policy.insert("a:", 0);
        policy.insert("b:", 10);
        assert_eq!(policy.zero_entries(), vec!["a:", "<default>"]);
    }
}
