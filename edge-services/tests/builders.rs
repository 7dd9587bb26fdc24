//! Composite builders over an in-memory snapshot store.

use chrono::{Duration, Utc};
use edge_core::{keys, Asset, FreshnessStatus, TtlPolicy};
use edge_services::{
    build_alerts_live, build_asset_card, build_market_overview, build_paper_summary, build_regime,
    build_supercard, AlertKind, EdgeConfig, PillarStatus, Resolver, SqliteSnapshotStore,
};
use serde_json::{json, Value};

fn put(store: &SqliteSnapshotStore, key: &str, payload: Value, age_secs: i64) {
    store
        .put_at(key, &payload, Some(Utc::now() - Duration::seconds(age_secs)))
        .unwrap();
}

/// A risk-off BTC tape: falling price, crowded funding, long-heavy liquidations.
fn seeded_store() -> SqliteSnapshotStore {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    put(
        &store,
        &keys::price(Asset::Btc),
        json!({"data": {"price": 68819, "change_24h": -2.06, "vol_24h": 31_500_000_000.0}}),
        30,
    );
    put(
        &store,
        &keys::funding(Asset::Btc),
        json!({"data": {"rate": 0.001178, "symbol": "BTC", "prev_rate": 0.003825}}),
        30,
    );
    put(
        &store,
        &keys::open_interest(Asset::Btc),
        json!({"data": {"oi_usd": 43_800_000_000.0, "oi_change_24h": -1.91}}),
        30,
    );
    put(
        &store,
        &keys::liquidations(Asset::Btc),
        json!({"raw": [
            {"exchange": "Binance", "liquidation_usd": 20_000_000.0},
            {"exchange": "All", "liquidation_usd": 63_000_000.0,
             "longLiquidation_usd": 51_030_000.0, "shortLiquidation_usd": 11_970_000.0}
        ]}),
        30,
    );
    put(
        &store,
        keys::GLOBAL,
        json!({"data": {"btc_dominance": 56.7, "eth_dominance": 9.8,
                        "total_volume_usd": 103_000_000_000.0}}),
        30,
    );
    put(
        &store,
        keys::FEAR_GREED,
        json!({"data": [{"value": "21", "value_classification": "Extreme Fear"}]}),
        30,
    );
    store
}

#[test]
fn test_empty_store_yields_full_shapes() {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    let config = EdgeConfig::default();
    let resolver = Resolver::new(&store, &config.ttl, Utc::now());

    let overview = serde_json::to_value(build_market_overview(&resolver).unwrap()).unwrap();
    let tiles = overview["kpis"].as_array().unwrap();
    assert_eq!(tiles.len(), 5);
    for tile in tiles {
        assert!(tile["value"].is_null());
        assert_eq!(tile["display"], "—");
        assert_eq!(tile["status"], "dead");
    }

    let card = serde_json::to_value(build_asset_card(&resolver, Asset::Eth).unwrap()).unwrap();
    assert_eq!(card["symbol"], "ETH");
    for field in [
        "price",
        "change_24h",
        "dominance",
        "vol_24h",
        "funding",
        "open_interest",
        "liquidations_24h",
    ] {
        assert_eq!(card["card"][field]["display"], "—", "field {}", field);
    }

    let supercard = build_supercard(&resolver, &config.supercard, Asset::Btc).unwrap();
    assert_eq!(supercard.pillars.len(), 6);
    assert!(supercard.pillars.iter().all(|p| p.value == "—"));
    assert!(supercard.pillars.iter().all(|p| p.status == PillarStatus::Neutral));
    assert_eq!(supercard.summary.stance, "neutral");
    assert_eq!(supercard.summary.confidence, "low");
    assert_eq!(supercard.summary.notes, vec!["—"; 3]);

    let regime = build_regime(&resolver, &config.regime).unwrap();
    assert_eq!(regime.regime.label, "Chop");
    assert_eq!(regime.regime.confidence, "low");
    assert_eq!(regime.axes.len(), 4);
    assert!(regime.axes.iter().all(|a| a.value == "—"));
    assert_eq!(regime.drivers, vec!["—"; 3]);

    let paper = build_paper_summary(&resolver, &config.paper).unwrap();
    let paper = serde_json::to_value(paper).unwrap();
    assert_eq!(paper["kpis"]["pnl_usdt"]["display"], "—");
    assert_eq!(paper["kpis"]["win_rate"]["display"], "—");
    assert_eq!(paper["accounts"]["total"]["display"], "—");
    assert_eq!(paper["curve"], json!([]));
}

#[test]
fn test_asset_card_values() {
    let store = seeded_store();
    let config = EdgeConfig::default();
    let resolver = Resolver::new(&store, &config.ttl, Utc::now());

    let card = build_asset_card(&resolver, Asset::Btc).unwrap().card;
    assert_eq!(card.price.display, "$68,819");
    assert_eq!(card.change_24h.display, "-2.06%");
    assert_eq!(card.dominance.display, "56.7%");
    assert_eq!(card.vol_24h.display, "$31.5B");
    assert_eq!(card.funding.display, "+0.118%");
    assert_eq!(card.open_interest.display, "$43.8B");
    assert_eq!(card.liquidations_24h.display, "$63.0M");
    assert_eq!(card.liq_long_pct.display, "81%");
    assert_eq!(card.liq_short_pct.display, "19%");
    assert_eq!(card.price.status, FreshnessStatus::Fresh);
}

#[test]
fn test_supercard_pillars_and_stance() {
    let store = seeded_store();
    let config = EdgeConfig::default();
    let resolver = Resolver::new(&store, &config.ttl, Utc::now());

    let card = build_supercard(&resolver, &config.supercard, Asset::Btc).unwrap();
    let pillar = |key: &str| card.pillars.iter().find(|p| p.key == key).unwrap();

    assert_eq!(card.summary.headline, "BTC SuperCard");
    assert_eq!(card.summary.stance, "cautious");
    assert_eq!(card.summary.confidence, "high");
    assert_eq!(card.summary.notes.len(), 3);
    assert!(card.summary.notes.iter().all(|n| n != "—"));

    assert_eq!(pillar("flow").value, "$63.0M liqs / $103.0B vol");
    assert_eq!(pillar("flow").status, PillarStatus::Neutral);
    assert_eq!(pillar("leverage").status, PillarStatus::Positive);
    assert_eq!(pillar("fragility").value, "81% long / 19% short");
    assert_eq!(pillar("fragility").status, PillarStatus::Positive);
    assert_eq!(pillar("momentum").status, PillarStatus::Negative);
    assert_eq!(pillar("sentiment").value, "21 — Extreme Fear");
    assert_eq!(pillar("sentiment").status, PillarStatus::Negative);
    assert_eq!(pillar("risk").status, PillarStatus::Neutral);
}

#[test]
fn test_regime_risk_off() {
    let store = seeded_store();
    let config = EdgeConfig::default();
    let resolver = Resolver::new(&store, &config.ttl, Utc::now());

    let regime = build_regime(&resolver, &config.regime).unwrap();
    let axis = |key: &str| regime.axes.iter().find(|a| a.key == key).unwrap().value.clone();

    assert_eq!(regime.regime.label, "Risk-Off");
    assert_eq!(regime.regime.confidence, "high");
    assert_eq!(axis("trend"), "Down");
    assert_eq!(axis("volatility"), "Chop");
    assert_eq!(axis("leverage"), "Crowded");
    assert_eq!(axis("liquidity"), "Tight");
    assert_eq!(regime.drivers.len(), 3);
    assert_eq!(regime.drivers[0], "BTC $68,819 • -2.06% 24h (trend axis)");
    assert_eq!(regime.drivers[1], "Funding +0.118% (crowding proxy)");
}

#[test]
fn test_alerts_flag_regime_flip_against_last_state() {
    let store = seeded_store();
    put(&store, &keys::regime_last("BTC"), json!({"label": "Chop"}), 120);
    put(&store, &keys::regime_last("ETH"), json!({"label": "Risk-Off"}), 120);
    put(&store, &keys::sentiment_last("BTC"), json!({"bucket": "EXTREME_FEAR"}), 120);
    let config = EdgeConfig::default();
    let resolver = Resolver::new(&store, &config.ttl, Utc::now());

    let alerts = build_alerts_live(&resolver, &config, Some(21), None).unwrap();
    assert_eq!(alerts.items.len(), 1);

    let flip = &alerts.items[0];
    assert_eq!(flip.kind, AlertKind::RegimeChange);
    assert_eq!(flip.headline, "BTC REGIME CHANGE");
    assert_eq!(flip.message, "Chop → Risk-Off");
    assert_eq!(flip.confidence, "high");
}

#[test]
fn test_dead_inputs_render_as_placeholders() {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    // Price TTL is 360s; two hours old is dead.
    put(
        &store,
        &keys::price(Asset::Btc),
        json!({"data": {"price": 68819, "change_24h": 5.0}}),
        7_200,
    );
    let config = EdgeConfig::default();
    let resolver = Resolver::new(&store, &config.ttl, Utc::now());

    let card = build_asset_card(&resolver, Asset::Btc).unwrap();
    assert_eq!(card.card.price.value, None);
    assert_eq!(card.card.price.display, "—");
    assert_eq!(card.card.price.status, FreshnessStatus::Dead);
    assert!(card.card.price.age_s.unwrap() >= 7_200.0);

    // A dead +5% must not drive the regime.
    let regime = build_regime(&resolver, &config.regime).unwrap();
    assert_eq!(regime.regime.label, "Chop");
}

#[test]
fn test_stale_inputs_are_kept_and_annotated() {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    put(
        &store,
        &keys::price(Asset::Btc),
        json!({"data": {"price": 68819, "change_24h": 1.5}}),
        400,
    );
    let ttl = TtlPolicy::default();
    let resolver = Resolver::new(&store, &ttl, Utc::now());

    let overview = build_market_overview(&resolver).unwrap();
    let price = &overview.kpis[0];
    assert_eq!(price.key, "btc_price");
    assert_eq!(price.kpi.value, Some(68819.0));
    assert_eq!(price.kpi.status, FreshnessStatus::Stale);
    assert_eq!(price.sub, "+1.50% 24h");
}

#[test]
fn test_paper_summary_from_snapshots() {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    let now = Utc::now();
    let day = |n: i64| (now - Duration::days(n)).to_rfc3339();

    put(&store, keys::PAPER_ACCOUNTS, json!({"data": {"total": 4, "active": 3}}), 60);
    put(&store, keys::PAPER_POSITIONS, json!({"data": {"open": 7}}), 60);
    put(
        &store,
        keys::PAPER_TRADES,
        json!({"data": {"trades": [
            {"t": day(45), "account_id": "a", "net_pnl_usdt": 1000},
            {"t": day(5), "account_id": "a", "net_pnl_usdt": "10"},
            {"t": day(4), "account_id": "b", "net_pnl_usdt": 10},
            {"t": day(3), "account_id": "a", "net_pnl_usdt": "-5"},
            {"t": day(2), "account_id": "b", "net_pnl_usdt": -10},
            {"t": day(1), "account_id": "a", "net_pnl_usdt": 20},
            {"t": "garbage", "net_pnl_usdt": 1}
        ]}}),
        60,
    );

    let config = EdgeConfig::default();
    let resolver = Resolver::new(&store, &config.ttl, now);
    let summary = build_paper_summary(&resolver, &config.paper).unwrap();

    assert_eq!(summary.accounts.total.display, "4");
    assert_eq!(summary.accounts.active.display, "3");
    assert_eq!(summary.kpis.open_positions.display, "7");
    assert_eq!(summary.kpis.trades.value, Some(5.0));
    assert_eq!(summary.kpis.pnl_usdt.display, "$25.00");
    assert_eq!(summary.kpis.win_rate.kpi.display, "60%");
    assert_eq!(summary.kpis.win_rate.wins, Some(3));
    assert_eq!(summary.kpis.max_drawdown.display, "75.0%");

    let values: Vec<f64> = summary.curve.iter().map(|p| p.v).collect();
    assert_eq!(values, vec![10.0, 20.0, 15.0, 5.0, 25.0]);
}

#[test]
fn test_paper_curve_is_capped_but_drawdown_uses_full_series() {
    let store = SqliteSnapshotStore::new_in_memory().unwrap();
    let now = Utc::now();

    // Up 1 per day from 10, with one sharp dip on a day that downsampling skips.
    let trades: Vec<Value> = (1..=29)
        .rev()
        .map(|n| {
            let pnl = match n {
                29 => 10,
                20 => -17,
                19 => 17,
                _ => 1,
            };
            json!({"t": (now - Duration::days(n)).to_rfc3339(), "net_pnl_usdt": pnl})
        })
        .collect();
    put(&store, keys::PAPER_TRADES, json!({"data": {"trades": trades}}), 60);

    let mut config = EdgeConfig::default();
    config.paper.max_curve_points = 3;
    let resolver = Resolver::new(&store, &config.ttl, now);
    let summary = build_paper_summary(&resolver, &config.paper).unwrap();

    assert_eq!(summary.curve.len(), 3);
    let dd = summary.kpis.max_drawdown.value.unwrap();
    assert!(dd > 90.0, "drawdown {}", dd);
}
