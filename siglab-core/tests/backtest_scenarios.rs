//! End-to-end engine scenarios against in-memory market data.

use chrono::{Datelike, NaiveDate, Weekday};
use proptest::prelude::*;
use siglab_core::data::MemorySource;
use siglab_core::domain::{Bar, FundamentalReport, NewsScore, StrategyId, TradeSide};
use siglab_core::engine::{BacktestEngine, EngineConfig, RunOutput};
use siglab_core::risk::{RiskConfig, RiskManager};
use siglab_core::traders::TraderSet;
use std::collections::BTreeMap;

fn bar(symbol: &str, date: NaiveDate, close: f64) -> Bar {
    Bar {
        symbol: symbol.to_string(),
        date,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1_000.0,
    }
}

/// The first `n` weekdays starting on or after `from`.
fn weekdays(from: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = from;
    while out.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        day = day.succ_opt().unwrap();
    }
    out
}

fn engine(source: &MemorySource) -> BacktestEngine<'_> {
    engine_with_risk(source, RiskConfig::default())
}

fn engine_with_risk(source: &MemorySource, config: RiskConfig) -> BacktestEngine<'_> {
    BacktestEngine::new(
        source,
        source,
        source,
        TraderSet::with_defaults(),
        RiskManager::new(config).unwrap(),
        EngineConfig::default(),
    )
    .unwrap()
}

fn assert_accounting_identity(output: &RunOutput) {
    for snap in &output.equity_curve {
        assert!(
            (snap.equity - (snap.cash + snap.positions_value)).abs() < 1e-6,
            "equity identity broken on {}: {} != {} + {}",
            snap.date,
            snap.equity,
            snap.cash,
            snap.positions_value
        );
        assert!(snap.cash >= 0.0, "cash went negative on {}", snap.date);
    }
}

#[test]
fn flat_market_produces_no_trades_and_preserves_capital() {
    let days = weekdays(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 30);
    let mut source = MemorySource::new();
    source.add_bars("AAA", days.iter().map(|&d| bar("AAA", d, 100.0)).collect());

    let start = days[25];
    let end = days[29];
    let output = engine(&source).run(
        &["AAA".to_string()],
        start,
        end,
        StrategyId::MeanReversion,
        0.0,
    );

    assert!(output.trades.is_empty());
    assert_eq!(output.equity_curve.len(), 5);
    for snap in &output.equity_curve {
        assert_eq!(snap.equity, 100_000.0);
        assert_eq!(snap.cash, 100_000.0);
        assert_eq!(snap.positions_value, 0.0);
    }
    assert_accounting_identity(&output);
}

#[test]
fn weekends_are_skipped() {
    // 2024-06-07 is a Friday; 2024-06-10 the following Monday.
    let friday = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
    let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let mut source = MemorySource::new();
    source.add_bars(
        "AAA",
        vec![bar("AAA", friday, 100.0), bar("AAA", monday, 100.0)],
    );

    let output = engine(&source).run(
        &["AAA".to_string()],
        friday,
        monday,
        StrategyId::MeanReversion,
        0.0,
    );

    let dates: Vec<NaiveDate> = output.equity_curve.iter().map(|s| s.date).collect();
    assert_eq!(dates, vec![friday, monday]);
}

#[test]
fn stop_loss_closes_a_losing_position() {
    // 19 flat days, then a -3.8% dip (mean-reversion entry), then a crash far
    // through the 5% stop.
    let days = weekdays(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 21);
    let mut bars: Vec<Bar> = days[..19].iter().map(|&d| bar("AAA", d, 100.0)).collect();
    bars.push(bar("AAA", days[19], 96.0));
    bars.push(bar("AAA", days[20], 90.0));
    let mut source = MemorySource::new();
    source.add_bars("AAA", bars);

    let output = engine(&source).run(
        &["AAA".to_string()],
        days[19],
        days[20],
        StrategyId::MeanReversion,
        0.0,
    );

    assert_eq!(output.trades.len(), 2);
    let entry = &output.trades[0];
    let exit = &output.trades[1];
    assert_eq!(entry.side, TradeSide::Buy);
    assert_eq!(entry.price, 96.0);
    assert_eq!(exit.side, TradeSide::Sell);
    assert_eq!(exit.price, 90.0);
    assert_eq!(exit.date, days[20]);
    assert!(exit.pnl < 0.0);

    // Default sizing caps the entry at 10% of equity: 10_000 / 96 shares,
    // each down 6.0 at the stop.
    let expected_qty = 10_000.0 / 96.0;
    assert!((entry.quantity - expected_qty).abs() < 1e-9);
    assert!((exit.pnl - (90.0 - 96.0) * expected_qty).abs() < 1e-6);

    let final_snap = output.equity_curve.last().unwrap();
    assert!((final_snap.equity - (100_000.0 + exit.pnl)).abs() < 1e-6);
    assert!(final_snap.positions_value.abs() < 1e-9);
    assert_accounting_identity(&output);
}

#[test]
fn ensemble_majority_opens_and_run_end_force_closes() {
    // Flat tape keeps momentum and mean-reversion on Hold; strong sentiment
    // and cheap fundamentals carry the vote 3-2 for Buy.
    let days = weekdays(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), 27);
    let mut source = MemorySource::new();
    source.add_bars("CCC", days.iter().map(|&d| bar("CCC", d, 100.0)).collect());
    source.add_sentiment(
        "CCC",
        days[22..25]
            .iter()
            .map(|&d| NewsScore {
                date: d,
                polarity: 0.8,
            })
            .collect(),
    );
    source.add_fundamentals(
        "CCC",
        vec![FundamentalReport {
            date: days[0],
            ratios: BTreeMap::from([
                ("pe_ratio".to_string(), 10.0),
                ("revenue_growth".to_string(), 0.10),
                ("earnings_growth".to_string(), 0.10),
            ]),
        }],
    );

    let output = engine(&source).run(
        &["CCC".to_string()],
        days[25],
        days[26],
        StrategyId::Ensemble,
        0.0,
    );

    // One entry, then the terminal force-close at an unchanged mark.
    assert_eq!(output.trades.len(), 2);
    assert_eq!(output.trades[0].side, TradeSide::Buy);
    assert_eq!(output.trades[1].side, TradeSide::Sell);
    assert_eq!(output.trades[1].date, days[26]);
    assert_eq!(output.trades[1].pnl, 0.0);
    assert_eq!(output.trades[0].strategy, "ensemble");

    let final_equity = output.equity_curve.last().unwrap().equity;
    assert!((final_equity - 100_000.0).abs() < 1e-6);
    assert_accounting_identity(&output);
}

#[test]
fn one_position_per_symbol() {
    // The dip persists for two days, signalling Buy both days; the second
    // Buy must be ignored while the first position is open.
    let days = weekdays(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 21);
    let mut bars: Vec<Bar> = days[..19].iter().map(|&d| bar("AAA", d, 100.0)).collect();
    bars.push(bar("AAA", days[19], 96.0));
    bars.push(bar("AAA", days[20], 95.5));
    let mut source = MemorySource::new();
    source.add_bars("AAA", bars);

    let output = engine(&source).run(
        &["AAA".to_string()],
        days[19],
        days[20],
        StrategyId::MeanReversion,
        0.0,
    );

    let buys = output
        .trades
        .iter()
        .filter(|t| t.side == TradeSide::Buy)
        .count();
    assert_eq!(buys, 1);
}

#[test]
fn position_limit_binds_within_a_single_day() {
    // All three symbols dip into mean-reversion Buy territory on the same
    // day. With a one-position book, the second and third entries must see
    // the position opened moments earlier, not the count from the start of
    // the day.
    let days = weekdays(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 20);
    let mut source = MemorySource::new();
    for sym in ["AAA", "BBB", "CCC"] {
        let mut bars: Vec<Bar> = days[..19].iter().map(|&d| bar(sym, d, 100.0)).collect();
        bars.push(bar(sym, days[19], 96.0));
        source.add_bars(sym, bars);
    }

    let config = RiskConfig {
        max_positions: 1,
        ..RiskConfig::default()
    };
    let symbols: Vec<String> = ["AAA", "BBB", "CCC"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let output = engine_with_risk(&source, config).run(
        &symbols,
        days[19],
        days[19],
        StrategyId::MeanReversion,
        0.0,
    );

    let buys = output
        .trades
        .iter()
        .filter(|t| t.side == TradeSide::Buy)
        .count();
    assert_eq!(buys, 1, "only one entry may open: {:?}", output.trades);
    assert_accounting_identity(&output);
}

#[test]
fn elevated_risk_blocks_new_entries_but_not_exits() {
    // AAA crashes hard on the second day, breaching the daily-loss limit.
    // BBB dips into Buy territory the same day; its entry must be rejected
    // while AAA's protective exit still fires.
    let days = weekdays(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 21);

    let mut aaa: Vec<Bar> = days[..19].iter().map(|&d| bar("AAA", d, 100.0)).collect();
    aaa.push(bar("AAA", days[19], 96.0));
    aaa.push(bar("AAA", days[20], 40.0));

    let mut bbb: Vec<Bar> = days[..20].iter().map(|&d| bar("BBB", d, 50.0)).collect();
    bbb.push(bar("BBB", days[20], 48.0));

    let mut source = MemorySource::new();
    source.add_bars("AAA", aaa);
    source.add_bars("BBB", bbb);

    let output = engine(&source).run(
        &["AAA".to_string(), "BBB".to_string()],
        days[19],
        days[20],
        StrategyId::MeanReversion,
        0.0,
    );

    assert!(
        output.trades.iter().all(|t| t.symbol == "AAA"),
        "BBB entry should have been gated: {:?}",
        output.trades
    );
    let exit = output
        .trades
        .iter()
        .find(|t| t.side == TradeSide::Sell)
        .expect("AAA stop-loss exit");
    assert_eq!(exit.price, 40.0);
    assert!(exit.pnl < 0.0);
    assert_accounting_identity(&output);
}

#[test]
fn strategy_performance_tracks_closed_trades() {
    let days = weekdays(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 21);
    let mut bars: Vec<Bar> = days[..19].iter().map(|&d| bar("AAA", d, 100.0)).collect();
    bars.push(bar("AAA", days[19], 96.0));
    bars.push(bar("AAA", days[20], 90.0));
    let mut source = MemorySource::new();
    source.add_bars("AAA", bars);

    let output = engine(&source).run(
        &["AAA".to_string()],
        days[19],
        days[20],
        StrategyId::MeanReversion,
        0.0,
    );

    let perf = output
        .strategy_performance
        .get("mean_reversion")
        .expect("closing trade recorded");
    assert_eq!(perf.trades, 1);
    assert!(perf.pnl < 0.0);
}

#[test]
fn commission_is_charged_on_both_legs() {
    let days = weekdays(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), 27);
    let mut source = MemorySource::new();
    source.add_bars("CCC", days.iter().map(|&d| bar("CCC", d, 100.0)).collect());
    source.add_sentiment(
        "CCC",
        days[22..25]
            .iter()
            .map(|&d| NewsScore {
                date: d,
                polarity: 0.8,
            })
            .collect(),
    );

    let output = engine(&source).run(
        &["CCC".to_string()],
        days[25],
        days[26],
        StrategyId::Sentiment,
        0.001,
    );

    assert_eq!(output.trades.len(), 2);
    for trade in &output.trades {
        assert!(trade.commission > 0.0);
        assert!((trade.commission - trade.quantity * trade.price * 0.001).abs() < 1e-9);
    }
    // Round trip at an unchanged price loses exactly the two commissions.
    let total_commission: f64 = output.trades.iter().map(|t| t.commission).sum();
    let final_equity = output.equity_curve.last().unwrap().equity;
    assert!((final_equity - (100_000.0 - total_commission)).abs() < 1e-6);
}

proptest! {
    /// Accounting invariants hold for arbitrary price paths: cash never goes
    /// negative, every snapshot satisfies equity = cash + positions value,
    /// and the run never ends with an open position.
    #[test]
    fn accounting_invariants_hold_for_random_walks(
        closes in proptest::collection::vec(20.0_f64..200.0, 25..45)
    ) {
        let days = weekdays(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), closes.len());
        let mut source = MemorySource::new();
        source.add_bars(
            "AAA",
            days.iter().zip(&closes).map(|(&d, &c)| bar("AAA", d, c)).collect(),
        );

        let start = days[20];
        let end = *days.last().unwrap();
        let output = engine(&source).run(
            &["AAA".to_string()],
            start,
            end,
            StrategyId::MeanReversion,
            0.001,
        );

        for snap in &output.equity_curve {
            prop_assert!((snap.equity - (snap.cash + snap.positions_value)).abs() < 1e-6);
            prop_assert!(snap.cash >= -1e-9);
        }
        let buys = output.trades.iter().filter(|t| t.side == TradeSide::Buy).count();
        let sells = output.trades.iter().filter(|t| t.side == TradeSide::Sell).count();
        prop_assert_eq!(buys, sells, "every entry must be matched by an exit");
    }
}
