//! Widget policy configuration
//!
//! Everything tunable about the widgets lives here: TTLs, classifier bands,
//! rule tables, and feed/curve limits. Built once at startup and shared
//! read-only afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use edge_altme::ALTME_FNG_URL;
use edge_core::{Band, BandLevel, Cmp, Condition, ConfidenceScale, Rule, RuleTable, TtlPolicy};

/// Immutable configuration shared by every builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub ttl: TtlPolicy,
    pub regime: RegimePolicy,
    pub supercard: ScorecardPolicy,
    pub feed: FeedConfig,
    pub paper: PaperConfig,
    pub alerts: AlertsPolicy,
}

/// Longest accepted paper trading window
pub const MAX_WINDOW_DAYS: u32 = 3_650;

impl EdgeConfig {
    /// Load configuration from the environment
    ///
    /// Reads:
    /// - EDGE_POLICY_PATH: optional JSON policy file; defaults apply when unset
    /// - ALTME_URL: optional override of the fear & greed endpoint
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var("EDGE_POLICY_PATH") {
            Ok(path) if !path.trim().is_empty() => Self::from_path(path.trim())?,
            _ => Self::default(),
        };

        if let Ok(url) = env::var("ALTME_URL") {
            if !url.trim().is_empty() {
                config.feed.url = url.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON policy file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Parse a JSON policy document; missing sections keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson {
            field: "EDGE_POLICY_PATH".to_string(),
            error: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no request could work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = self.ttl.zero_entries().first() {
            return Err(ConfigError::InvalidValue {
                field: format!("ttl.{}", prefix),
                reason: "TTL must be positive".to_string(),
            });
        }
        if self.feed.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.timeout_ms".to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }
        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "feed.url".to_string(),
                reason: "URL cannot be empty".to_string(),
            });
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.paper.window_days) {
            return Err(ConfigError::InvalidValue {
                field: "paper.window_days".to_string(),
                reason: format!("window must be within 1..={} days", MAX_WINDOW_DAYS),
            });
        }
        if self.paper.max_curve_points < 2 {
            return Err(ConfigError::InvalidValue {
                field: "paper.max_curve_points".to_string(),
                reason: "curve needs both endpoints".to_string(),
            });
        }
        if self.alerts.default_limit == 0 || self.alerts.default_limit > self.alerts.max_limit {
            return Err(ConfigError::InvalidValue {
                field: "alerts.default_limit".to_string(),
                reason: format!(
                    "default {} must be within 1..={}",
                    self.alerts.default_limit, self.alerts.max_limit
                ),
            });
        }
        for (name, band) in self.supercard.bands().into_iter().chain(self.regime.bands()) {
            if band.low > band.high {
                return Err(ConfigError::InvalidValue {
                    field: name.to_string(),
                    reason: format!("band low {} exceeds high {}", band.low, band.high),
                });
            }
        }
        Ok(())
    }
}

/// Key and display label of one axis bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub key: String,
    pub label: String,
}

impl AxisLabel {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// A regime axis: one band and a label per bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisPolicy {
    pub band: Band,
    pub low: AxisLabel,
    pub mid: AxisLabel,
    pub high: AxisLabel,
}

impl AxisPolicy {
    pub fn classify(&self, value: Option<f64>) -> &AxisLabel {
        match self.band.classify(value) {
            BandLevel::Low => &self.low,
            BandLevel::Mid => &self.mid,
            BandLevel::High => &self.high,
        }
    }
}

/// Regime classifier policy
///
/// Rules see the bucket keys of each axis as labels (`trend`, `volatility`,
/// `leverage`, `liquidity`) and the fear & greed value as the metric
/// `fear_greed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimePolicy {
    pub trend: AxisPolicy,
    pub volatility: AxisPolicy,
    pub leverage: AxisPolicy,
    pub liquidity: AxisPolicy,
    pub rules: RuleTable<String>,
    pub confidence: ConfidenceScale,
}

impl RegimePolicy {
    fn bands(&self) -> Vec<(&'static str, Band)> {
        vec![
            ("regime.trend", self.trend.band),
            ("regime.volatility", self.volatility.band),
            ("regime.leverage", self.leverage.band),
            ("regime.liquidity", self.liquidity.band),
        ]
    }
}

impl Default for RegimePolicy {
    fn default() -> Self {
        let extreme_fear = || Condition::metric("fear_greed", Cmp::Le, 25.0);

        Self {
            trend: AxisPolicy {
                band: Band::new(-1.0, 1.0),
                low: AxisLabel::new("down", "Down"),
                mid: AxisLabel::new("flat", "Flat"),
                high: AxisLabel::new("up", "Up"),
            },
            volatility: AxisPolicy {
                band: Band::new(25_000_000.0, 120_000_000.0),
                low: AxisLabel::new("calm", "Calm"),
                mid: AxisLabel::new("chop", "Chop"),
                high: AxisLabel::new("shock", "Shock"),
            },
            leverage: AxisPolicy {
                band: Band::new(-0.02, 0.10),
                low: AxisLabel::new("low", "Light"),
                mid: AxisLabel::new("neutral", "Normal"),
                high: AxisLabel::new("high", "Crowded"),
            },
            liquidity: AxisPolicy {
                band: Band::new(40.0, 70.0),
                low: AxisLabel::new("loose", "Loose"),
                mid: AxisLabel::new("normal", "Normal"),
                high: AxisLabel::new("tight", "Tight"),
            },
            rules: RuleTable::new(
                vec![
                    Rule::new(
                        "Risk-Off".to_string(),
                        vec![
                            Condition::label("trend", ["down"]),
                            Condition::any(vec![
                                Condition::label("leverage", ["high"]),
                                Condition::label("liquidity", ["tight"]),
                                extreme_fear(),
                            ]),
                        ],
                    ),
                    Rule::new(
                        "Trend".to_string(),
                        vec![
                            Condition::label("trend", ["up", "down"]),
                            Condition::not(Condition::label("volatility", ["chop"])),
                        ],
                    ),
                    Rule::new(
                        "Risk-On".to_string(),
                        vec![
                            Condition::label("trend", ["up"]),
                            Condition::not(Condition::label("leverage", ["high"])),
                            Condition::not(extreme_fear()),
                        ],
                    ),
                ],
                "Chop".to_string(),
            ),
            confidence: ConfidenceScale {
                high_at: 4,
                medium_at: 2,
            },
        }
    }
}

/// SuperCard policy
///
/// Stance rules see the metrics `change_24h`, `fear_greed`, `funding_pct`
/// and `liq_long_pct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorecardPolicy {
    /// Liquidation total, USD
    pub flow: Band,
    /// Funding, percent
    pub leverage: Band,
    /// Long share of liquidations, percent
    pub fragility: Band,
    /// 24h price change, percent
    pub momentum: Band,
    /// Fear & greed value
    pub sentiment: Band,
    /// 24h open interest change, percent
    pub risk: Band,
    pub stance: RuleTable<String>,
    pub confidence: ConfidenceScale,
}

impl ScorecardPolicy {
    fn bands(&self) -> Vec<(&'static str, Band)> {
        vec![
            ("supercard.flow", self.flow),
            ("supercard.leverage", self.leverage),
            ("supercard.fragility", self.fragility),
            ("supercard.momentum", self.momentum),
            ("supercard.sentiment", self.sentiment),
            ("supercard.risk", self.risk),
        ]
    }
}

impl Default for ScorecardPolicy {
    fn default() -> Self {
        Self {
            flow: Band::new(25_000_000.0, 120_000_000.0),
            leverage: Band::new(-0.02, 0.10),
            fragility: Band::new(40.0, 70.0),
            momentum: Band::new(-1.0, 1.0),
            sentiment: Band::new(25.0, 60.0),
            risk: Band::new(-2.0, 2.0),
            stance: RuleTable::new(
                vec![
                    Rule::new(
                        "cautious".to_string(),
                        vec![
                            Condition::metric("fear_greed", Cmp::Le, 25.0),
                            Condition::metric("change_24h", Cmp::Lt, 0.0),
                        ],
                    ),
                    Rule::new(
                        "crowded-longs".to_string(),
                        vec![
                            Condition::metric("funding_pct", Cmp::Ge, 0.10),
                            Condition::metric("liq_long_pct", Cmp::Ge, 70.0),
                        ],
                    ),
                    Rule::new(
                        "risk-on".to_string(),
                        vec![Condition::metric("change_24h", Cmp::Gt, 1.0)],
                    ),
                ],
                "neutral".to_string(),
            ),
            confidence: ConfidenceScale {
                high_at: 5,
                medium_at: 3,
            },
        }
    }
}

/// Fear & greed feed cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Cached copies younger than this are served without a live call
    pub max_age_secs: u64,
    /// Bound on the live call
    pub timeout_ms: u64,
    pub url: String,
    /// Points in the history chart
    pub history_len: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 300,
            timeout_ms: 6_000,
            url: ALTME_FNG_URL.to_string(),
            history_len: 7,
        }
    }
}

/// Paper trading summary settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    /// Trades older than this are ignored
    pub window_days: u32,
    /// Cap on transported curve points
    pub max_curve_points: usize,
    /// Equity the cumulative curve starts from
    pub starting_equity: Decimal,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            max_curve_points: 60,
            starting_equity: Decimal::ZERO,
        }
    }
}

/// Alerts ticker policy
///
/// Sentiment rules see the fear & greed value as the metric `fear_greed`;
/// with no reading the default bucket applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsPolicy {
    pub sentiment: RuleTable<String>,
    /// Tickers that get a regime item
    pub regime_assets: Vec<String>,
    /// Tickers that get a sentiment item
    pub sentiment_assets: Vec<String>,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for AlertsPolicy {
    fn default() -> Self {
        let at_most = |label: &str, value: f64| {
            Rule::new(
                label.to_string(),
                vec![Condition::metric("fear_greed", Cmp::Le, value)],
            )
        };

        Self {
            sentiment: RuleTable::new(
                vec![
                    at_most("EXTREME_FEAR", 25.0),
                    at_most("FEAR", 45.0),
                    at_most("NEUTRAL", 55.0),
                    at_most("GREED", 75.0),
                    Rule::new(
                        "EXTREME_GREED".to_string(),
                        vec![Condition::metric("fear_greed", Cmp::Gt, 75.0)],
                    ),
                ],
                "NEUTRAL".to_string(),
            ),
            regime_assets: vec!["BTC".to_string(), "ETH".to_string()],
            sentiment_assets: vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()],
            default_limit: 50,
            max_limit: 200,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Invalid JSON in {field}: {error}")]
    InvalidJson { field: String, error: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
