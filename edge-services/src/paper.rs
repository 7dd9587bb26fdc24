//! Paper trading summary
//!
//! Reads the collector's paper-trading rollups and derives the headline
//! KPIs and a daily cumulative equity curve. Drawdown is measured on the
//! full curve; only the transported curve is downsampled.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use edge_core::{
    downsample, keys, max_drawdown, EdgeResult, KpiKind, KpiView, PathExpr, RESPONSE_VERSION,
};

use crate::config::PaperConfig;
use crate::resolver::{Dependency, Resolver, SourceView};

const DISCLAIMER: &str = "Paper trading only. Metrics are best-effort based on available snapshots.";

const ACCOUNTS_TOTAL: &str = "accounts_total";
const ACCOUNTS_ACTIVE: &str = "accounts_active";
const OPEN_POSITIONS: &str = "open_positions";

/// One closed trade from `paper:trades:*`
#[derive(Debug, Clone, PartialEq)]
pub struct PaperTrade {
    pub t: DateTime<Utc>,
    pub account_id: Option<String>,
    pub net_pnl: Decimal,
}

impl PaperTrade {
    /// Parse one row; `None` if the time or PnL is unreadable
    pub fn from_value(row: &Value) -> Option<Self> {
        let t = match row.get("t")? {
            Value::String(s) => DateTime::parse_from_rfc3339(s).ok()?.with_timezone(&Utc),
            Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0)?,
            _ => return None,
        };

        let net_pnl = match row.get("net_pnl_usdt")? {
            Value::Number(n) => parse_decimal(&n.to_string())?,
            Value::String(s) => parse_decimal(s.trim())?,
            _ => return None,
        };

        let account_id = row.get("account_id").and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Some(Self {
            t,
            account_id,
            net_pnl,
        })
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    s.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Point of the cumulative equity curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Day, `YYYY-MM-DD`
    pub t: String,
    pub v: f64,
}

/// Aggregates over the trades in the window
#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub count: usize,
    pub wins: u32,
    pub losses: u32,
    pub pnl: Decimal,
    /// Daily cumulative equity, chronological
    pub curve: Vec<(NaiveDate, Decimal)>,
}

impl TradeStats {
    pub fn from_trades(trades: &[PaperTrade], starting_equity: Decimal) -> Self {
        let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        let mut wins = 0;
        let mut losses = 0;
        let mut pnl = Decimal::ZERO;

        for trade in trades {
            pnl += trade.net_pnl;
            if trade.net_pnl > Decimal::ZERO {
                wins += 1;
            } else if trade.net_pnl < Decimal::ZERO {
                losses += 1;
            }
            *daily.entry(trade.t.date_naive()).or_default() += trade.net_pnl;
        }

        let mut equity = starting_equity;
        let curve = daily
            .into_iter()
            .map(|(day, day_pnl)| {
                equity += day_pnl;
                (day, equity)
            })
            .collect();

        Self {
            count: trades.len(),
            wins,
            losses,
            pnl,
            curve,
        }
    }

    /// Win share of decisive trades, in percent
    pub fn win_rate(&self) -> Option<f64> {
        let decisive = self.wins + self.losses;
        (decisive > 0).then(|| f64::from(self.wins) / f64::from(decisive) * 100.0)
    }

    pub fn max_drawdown_pct(&self) -> Option<f64> {
        let values: Vec<f64> = self.curve.iter().filter_map(|(_, v)| v.to_f64()).collect();
        max_drawdown(&values).map(|dd| dd.pct)
    }

    pub fn curve_points(&self) -> Vec<CurvePoint> {
        self.curve
            .iter()
            .filter_map(|(day, v)| {
                Some(CurvePoint {
                    t: day.format("%Y-%m-%d").to_string(),
                    v: v.round_dp(2).to_f64()?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Accounts {
    pub total: KpiView,
    pub active: KpiView,
}

#[derive(Debug, Clone, Serialize)]
pub struct WinRate {
    #[serde(flatten)]
    pub kpi: KpiView,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaperKpis {
    pub pnl_usdt: KpiView,
    pub win_rate: WinRate,
    pub trades: KpiView,
    pub open_positions: KpiView,
    pub max_drawdown: KpiView,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaperSummary {
    pub ts: DateTime<Utc>,
    pub version: &'static str,
    pub window_days: u32,
    pub accounts: Accounts,
    pub kpis: PaperKpis,
    pub curve: Vec<CurvePoint>,
    pub disclaimer: &'static str,
    pub sources: Vec<SourceView>,
}

pub fn build_paper_summary(
    resolver: &Resolver<'_>,
    config: &PaperConfig,
) -> EdgeResult<PaperSummary> {
    let deps = vec![
        Dependency::new(ACCOUNTS_TOTAL, keys::PAPER_ACCOUNTS, "data.total", KpiKind::Count)?,
        Dependency::new(ACCOUNTS_ACTIVE, keys::PAPER_ACCOUNTS, "data.active", KpiKind::Count)?,
        Dependency::new(OPEN_POSITIONS, keys::PAPER_POSITIONS, "data.open", KpiKind::Count)?,
    ];
    let resolved = resolver.resolve_all(&deps);
    let trades_path = PathExpr::parse("data.trades")?;
    let trades_src = resolver.fetch(keys::PAPER_TRADES);

    // No lower bound when the window reaches past the representable range
    let since = Duration::try_days(i64::from(config.window_days))
        .and_then(|window| resolver.now().checked_sub_signed(window));
    let stats = trades_src
        .usable_payload()
        .and_then(|payload| trades_path.resolve(payload).found())
        .and_then(Value::as_array)
        .map(|rows| {
            let mut skipped = 0;
            let trades: Vec<PaperTrade> = rows
                .iter()
                .filter_map(|row| {
                    let trade = PaperTrade::from_value(row);
                    if trade.is_none() {
                        skipped += 1;
                    }
                    trade
                })
                .filter(|trade| since.is_none_or(|since| trade.t >= since))
                .collect();
            if skipped > 0 {
                warn!("Skipped {} unreadable paper trades", skipped);
            }
            TradeStats::from_trades(&trades, config.starting_equity)
        });

    let (pnl, win_rate, count, drawdown, wins, losses, curve) = match &stats {
        Some(stats) => {
            debug!("Paper summary over {} trades", stats.count);
            let curve = downsample(&stats.curve_points(), config.max_curve_points);
            (
                stats.pnl.to_f64(),
                stats.win_rate(),
                Some(stats.count as f64),
                stats.max_drawdown_pct(),
                Some(stats.wins),
                Some(stats.losses),
                curve,
            )
        }
        None => (None, None, None, None, None, None, Vec::new()),
    };

    let kpis = PaperKpis {
        pnl_usdt: trades_src.kpi(KpiKind::Amount, false, pnl).view(),
        win_rate: WinRate {
            kpi: trades_src.kpi(KpiKind::Percent, false, win_rate).view_with(0),
            wins,
            losses,
        },
        trades: trades_src.kpi(KpiKind::Count, false, count).view(),
        open_positions: resolved.kpi(OPEN_POSITIONS).view(),
        max_drawdown: trades_src.kpi(KpiKind::Percent, false, drawdown).view_with(1),
    };

    let mut sources = resolved.source_views();
    sources.push(trades_src.view());
    sources.sort_by(|a, b| a.key.cmp(&b.key));

    Ok(PaperSummary {
        ts: resolver.now(),
        version: RESPONSE_VERSION,
        window_days: config.window_days,
        accounts: Accounts {
            total: resolved.kpi(ACCOUNTS_TOTAL).view(),
            active: resolved.kpi(ACCOUNTS_ACTIVE).view(),
        },
        kpis,
        curve,
        disclaimer: DISCLAIMER,
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn trade(day: u32, pnl: Decimal) -> PaperTrade {
        PaperTrade {
            t: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
            account_id: Some("a1".to_string()),
            net_pnl: pnl,
        }
    }

    #[test]
    fn test_parse_trade_rows() {
        let row = json!({"t": "2026-01-05T10:00:00Z", "account_id": 42, "net_pnl_usdt": "-12.50"});
        let trade = PaperTrade::from_value(&row).unwrap();
        assert_eq!(trade.net_pnl, dec!(-12.50));
        assert_eq!(trade.account_id.as_deref(), Some("42"));

        let row = json!({"t": 1767225600, "net_pnl_usdt": 0.1});
        assert_eq!(PaperTrade::from_value(&row).unwrap().net_pnl, dec!(0.1));

        assert!(PaperTrade::from_value(&json!({"t": "yesterday", "net_pnl_usdt": 1})).is_none());
        assert!(PaperTrade::from_value(&json!({"t": 1767225600})).is_none());
    }

    #[test]
    fn test_stats_sum_exactly() {
        let trades: Vec<PaperTrade> = (0..10).map(|_| trade(1, dec!(0.1))).collect();
        let stats = TradeStats::from_trades(&trades, Decimal::ZERO);
        assert_eq!(stats.pnl, dec!(1.0));
        assert_eq!(stats.curve.len(), 1);
    }

    #[test]
    fn test_daily_curve_and_drawdown() {
        let trades = vec![
            trade(1, dec!(10)),
            trade(2, dec!(10)),
            trade(3, dec!(-5)),
            trade(4, dec!(-10)),
            trade(5, dec!(20)),
            trade(5, dec!(0)),
        ];
        let stats = TradeStats::from_trades(&trades, Decimal::ZERO);

        let values: Vec<f64> = stats.curve_points().iter().map(|p| p.v).collect();
        assert_eq!(values, vec![10.0, 20.0, 15.0, 5.0, 25.0]);
        assert_eq!(stats.curve_points()[0].t, "2026-01-01");
        assert!((stats.max_drawdown_pct().unwrap() - 75.0).abs() < 1e-9);

        assert_eq!(stats.wins, 3);
        assert_eq!(stats.losses, 2);
        assert_eq!(stats.win_rate(), Some(60.0));
        assert_eq!(stats.count, 6);
    }

    #[test]
    fn test_no_decisive_trades_has_no_win_rate() {
        let stats = TradeStats::from_trades(&[trade(1, Decimal::ZERO)], Decimal::ZERO);
        assert_eq!(stats.win_rate(), None);
        assert_eq!(stats.max_drawdown_pct(), Some(0.0));
    }

    #[test]
    fn test_window_past_calendar_range_keeps_all_trades() {
        use crate::store::SqliteSnapshotStore;
        use edge_core::TtlPolicy;

        let store = SqliteSnapshotStore::new_in_memory().unwrap();
        store
            .put_at(
                keys::PAPER_TRADES,
                &json!({"data": {"trades": [
                    {"t": "2001-01-01T00:00:00Z", "net_pnl_usdt": 5},
                    {"t": 1767225600, "net_pnl_usdt": "-2"}
                ]}}),
                Some(Utc::now()),
            )
            .unwrap();
        let ttl = TtlPolicy::default();
        let resolver = Resolver::new(&store, &ttl, Utc::now());
        let config = PaperConfig {
            window_days: u32::MAX,
            ..PaperConfig::default()
        };

        let summary = build_paper_summary(&resolver, &config).unwrap();
        assert_eq!(summary.kpis.trades.value, Some(2.0));
        assert_eq!(summary.kpis.pnl_usdt.display, "$3.00");
    }
}
