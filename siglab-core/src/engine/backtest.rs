//! Day-by-day backtest loop.
//!
//! The loop advances a calendar clock from start to end date inclusive and,
//! on each trading day: marks open positions to the day's close, generates
//! one signal per requested symbol, routes entries through the risk gate,
//! executes approved trades, checks stop-loss/take-profit breaches (exits
//! bypass the gate), and appends exactly one equity snapshot per day. On the
//! final date every remaining position is force-closed at its last mark.
//!
//! A data gap for one symbol on one day holds that symbol for that day only;
//! nothing inside the loop can abort a run. The engine is single-threaded
//! and deterministic — identical inputs produce bit-identical output.

use crate::data::{
    with_retry, DataError, FundamentalSource, MarketDataSource, NewsSentimentSource, RetryPolicy,
};
use crate::domain::{
    EquitySnapshot, MarketSnapshot, PositionSide, Signal, StrategyId, Trade,
};
use crate::engine::ledger::{Ledger, StrategyPerformance};
use crate::risk::{correlation_score, PortfolioRisk, RiskManager};
use crate::traders::{majority_vote, TraderSet};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Construction-time configuration error. The only fatal error class: raised
/// before any simulation starts, never from inside the loop.
#[derive(Debug, Error)]
pub enum InvalidEngineConfig {
    #[error("initial_capital must be positive, got {0}")]
    InitialCapital(f64),
    #[error("bar_lookback must be at least 2")]
    BarLookback,
}

/// Engine tuning knobs. Lookbacks bound how much history each provider call
/// requests.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub initial_capital: f64,
    /// Bars fetched per snapshot.
    pub bar_lookback: usize,
    /// Scored articles fetched per snapshot.
    pub news_lookback: usize,
    /// Fundamentals reports fetched per snapshot.
    pub fundamental_lookback: usize,
    /// Daily returns used for the sizing volatility estimate.
    pub volatility_window: usize,
    /// Daily returns per symbol used for the correlation score.
    pub correlation_window: usize,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            bar_lookback: 100,
            news_lookback: 20,
            fundamental_lookback: 4,
            volatility_window: 20,
            correlation_window: 20,
            retry: RetryPolicy::immediate(3),
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), InvalidEngineConfig> {
        if self.initial_capital <= 0.0 {
            return Err(InvalidEngineConfig::InitialCapital(self.initial_capital));
        }
        if self.bar_lookback < 2 {
            return Err(InvalidEngineConfig::BarLookback);
        }
        Ok(())
    }
}

/// Raw output of one run. Metric reduction happens in the runner.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub initial_capital: f64,
    pub equity_curve: Vec<EquitySnapshot>,
    pub trades: Vec<Trade>,
    pub strategy_performance: BTreeMap<String, StrategyPerformance>,
    /// Risk assessment from the last simulated trading day.
    pub risk_report: Option<PortfolioRisk>,
}

/// The simulation engine: providers, traders, and the risk manager wired
/// around a ledger it owns exclusively for the duration of a run.
pub struct BacktestEngine<'a> {
    market: &'a dyn MarketDataSource,
    news: &'a dyn NewsSentimentSource,
    fundamentals: &'a dyn FundamentalSource,
    traders: TraderSet,
    risk: RiskManager,
    config: EngineConfig,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(
        market: &'a dyn MarketDataSource,
        news: &'a dyn NewsSentimentSource,
        fundamentals: &'a dyn FundamentalSource,
        traders: TraderSet,
        risk: RiskManager,
        config: EngineConfig,
    ) -> Result<Self, InvalidEngineConfig> {
        config.validate()?;
        Ok(Self {
            market,
            news,
            fundamentals,
            traders,
            risk,
            config,
        })
    }

    /// Replay `start..=end` and simulate `strategy` over `symbols`.
    pub fn run(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        strategy: StrategyId,
        commission_rate: f64,
    ) -> RunOutput {
        info!(%start, %end, %strategy, ?symbols, "starting backtest");

        let mut ledger = Ledger::new(self.config.initial_capital);
        let mut equity_curve: Vec<EquitySnapshot> = Vec::new();
        let mut equity_peak = self.config.initial_capital;
        let mut last_report: Option<PortfolioRisk> = None;

        let mut day = start;
        while day <= end {
            if !is_trading_day(day) {
                let Some(next) = day.succ_opt() else { break };
                day = next;
                continue;
            }

            // Mark open positions to today's close where a bar exists.
            let marks: Vec<(String, f64)> = ledger
                .positions()
                .keys()
                .filter_map(|sym| self.price_on(sym, day).map(|px| (sym.clone(), px)))
                .collect();
            for (sym, px) in marks {
                ledger.mark(&sym, px);
            }

            // Day-over-day equity delta, against yesterday's snapshot.
            let prev_equity = equity_curve
                .last()
                .map(|s| s.equity)
                .unwrap_or(self.config.initial_capital);
            let equity = ledger.equity();
            equity_peak = equity_peak.max(equity);
            let daily_pnl = equity - prev_equity;
            let drawdown = if equity_peak > 0.0 {
                (equity_peak - equity) / equity_peak
            } else {
                0.0
            };

            let correlation = self.position_correlation(&ledger, day);
            let risk = self
                .risk
                .assess(equity, daily_pnl, drawdown, ledger.positions(), correlation);

            // One signal per symbol; symbols without a bar today are held.
            for symbol in symbols {
                let Some(price) = self.price_on(symbol, day) else {
                    debug!(symbol, %day, "no bar today; holding");
                    continue;
                };
                let Some(snapshot) = self.snapshot_for(symbol, day) else {
                    continue;
                };
                let signal = self.signal_for(strategy, &snapshot);

                match signal {
                    Signal::Buy if !ledger.has_position(symbol) => {
                        // Gate against live state: entries executed earlier in
                        // this same loop count towards the position limit.
                        let equity_now = ledger.equity();
                        let drawdown_now = if equity_peak > 0.0 {
                            (equity_peak - equity_now) / equity_peak
                        } else {
                            0.0
                        };
                        let gate = self.risk.assess(
                            equity_now,
                            equity_now - prev_equity,
                            drawdown_now,
                            ledger.positions(),
                            self.position_correlation(&ledger, day),
                        );
                        if let Some(reason) = self.risk.gate_entry(&gate) {
                            debug!(symbol, %day, %reason, "entry rejected");
                            continue;
                        }
                        self.enter_long(
                            &mut ledger,
                            symbol,
                            price,
                            day,
                            strategy,
                            commission_rate,
                            &snapshot,
                        );
                    }
                    Signal::Sell if ledger.has_position(symbol) => {
                        ledger.sell(symbol, price, day, strategy.as_str(), commission_rate);
                    }
                    _ => {}
                }
            }

            // Stop-loss / take-profit sweeps bypass the gate entirely.
            let breached: Vec<(String, f64)> = ledger
                .positions()
                .values()
                .filter(|pos| self.risk.exit_breach(pos).is_some())
                .map(|pos| (pos.symbol.clone(), pos.current_price))
                .collect();
            for (symbol, mark) in breached {
                debug!(symbol = %symbol, %day, "protective exit triggered");
                ledger.sell(&symbol, mark, day, strategy.as_str(), commission_rate);
            }

            // Exactly one snapshot per distinct day.
            if equity_curve.last().map(|s| s.date) != Some(day) {
                let cash = ledger.cash();
                let positions_value = ledger.positions_value();
                equity_curve.push(EquitySnapshot {
                    date: day,
                    equity: cash + positions_value,
                    cash,
                    positions_value,
                });
            }

            last_report = Some(risk);
            let Some(next) = day.succ_opt() else { break };
            day = next;
        }

        // Terminal state: force-close everything at the last available mark.
        let open: Vec<(String, f64)> = ledger
            .positions()
            .values()
            .map(|pos| (pos.symbol.clone(), pos.current_price))
            .collect();
        for (symbol, mark) in open {
            debug!(symbol = %symbol, "force-closing at end of run");
            ledger.sell(&symbol, mark, end, strategy.as_str(), commission_rate);
        }

        info!(
            trades = ledger.trades().len(),
            final_equity = ledger.equity(),
            "backtest complete"
        );

        RunOutput {
            initial_capital: self.config.initial_capital,
            equity_curve,
            trades: ledger.trades().to_vec(),
            strategy_performance: ledger.strategy_performance().clone(),
            risk_report: last_report,
        }
    }

    /// Resolve a signal for one snapshot under the run's strategy.
    fn signal_for(&self, strategy: StrategyId, snapshot: &MarketSnapshot) -> Signal {
        match strategy {
            StrategyId::Ensemble => {
                let votes: Vec<Signal> =
                    self.traders.iter().map(|t| t.evaluate(snapshot)).collect();
                majority_vote(&votes)
            }
            single => self
                .traders
                .get(single.as_str())
                .map(|t| t.evaluate(snapshot))
                .unwrap_or(Signal::Hold),
        }
    }

    /// Size and execute an approved entry.
    fn enter_long(
        &self,
        ledger: &mut Ledger,
        symbol: &str,
        price: f64,
        day: NaiveDate,
        strategy: StrategyId,
        commission_rate: f64,
        snapshot: &MarketSnapshot,
    ) {
        let volatility = self.volatility(snapshot);
        let size = self.risk.position_size(ledger.equity(), volatility);
        if size <= 0.0 {
            debug!(symbol, "sizing declined the trade");
            return;
        }
        let quantity = size / price;
        let (stop_loss, take_profit) = self.risk.exit_levels(PositionSide::Long, price);
        ledger.buy(
            symbol,
            PositionSide::Long,
            quantity,
            price,
            day,
            strategy.as_str(),
            commission_rate,
            Some(stop_loss),
            Some(take_profit),
        );
    }

    /// The close for `symbol` dated exactly `day`, if a bar exists.
    fn price_on(&self, symbol: &str, day: NaiveDate) -> Option<f64> {
        let result = with_retry(self.config.retry, "bars", || {
            self.market.bars(symbol, day, 1)
        });
        match result {
            Ok(bars) => bars.first().filter(|b| b.date == day).map(|b| b.close),
            Err(DataError::Unavailable { .. }) => None,
            Err(err) => {
                warn!(%err, symbol, "price lookup degraded to no data");
                None
            }
        }
    }

    /// Assemble the per-symbol view for the traders. None when the symbol has
    /// no price history at all; news and fundamentals degrade to empty.
    fn snapshot_for(&self, symbol: &str, day: NaiveDate) -> Option<MarketSnapshot> {
        let bars = match with_retry(self.config.retry, "bars", || {
            self.market.bars(symbol, day, self.config.bar_lookback)
        }) {
            Ok(bars) if !bars.is_empty() => bars,
            Ok(_) | Err(DataError::Unavailable { .. }) => return None,
            Err(err) => {
                warn!(%err, symbol, "bar history degraded to no data");
                return None;
            }
        };

        let sentiment = with_retry(self.config.retry, "sentiment", || {
            self.news.sentiment(symbol, self.config.news_lookback)
        })
        .unwrap_or_else(|err| {
            warn!(%err, symbol, "sentiment degraded to empty");
            Vec::new()
        });

        let fundamentals = with_retry(self.config.retry, "fundamentals", || {
            self.fundamentals
                .metrics(symbol, self.config.fundamental_lookback)
        })
        .unwrap_or_else(|err| {
            warn!(%err, symbol, "fundamentals degraded to empty");
            Vec::new()
        });

        Some(MarketSnapshot {
            symbol: symbol.to_string(),
            bars,
            sentiment,
            fundamentals,
        })
    }

    /// Stdev of recent daily returns; 0.02 when the history is too short,
    /// so a thin tape sizes conservatively rather than not at all.
    fn volatility(&self, snapshot: &MarketSnapshot) -> f64 {
        let returns = snapshot.returns();
        let window = returns.len().min(self.config.volatility_window);
        if window < 2 {
            return 0.02;
        }
        let slice = &returns[..window];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / window as f64;
        var.sqrt()
    }

    /// Mean absolute pairwise correlation of recent returns across the
    /// symbols currently held.
    fn position_correlation(&self, ledger: &Ledger, day: NaiveDate) -> f64 {
        if ledger.positions().len() < 2 {
            return 0.0;
        }
        let series: Vec<Vec<f64>> = ledger
            .positions()
            .keys()
            .filter_map(|sym| {
                let bars = with_retry(self.config.retry, "bars", || {
                    self.market.bars(sym, day, self.config.correlation_window + 1)
                })
                .ok()?;
                let snapshot = MarketSnapshot {
                    symbol: sym.clone(),
                    bars,
                    ..Default::default()
                };
                let returns = snapshot.returns();
                (returns.len() >= 2).then_some(returns)
            })
            .collect();
        correlation_score(&series)
    }
}

/// Weekends are non-trading days.
pub fn is_trading_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekends_are_not_trading_days() {
        // 2024-06-01 is a Saturday.
        assert!(!is_trading_day(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert!(!is_trading_day(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()));
        assert!(is_trading_day(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()));
    }

    #[test]
    fn config_rejects_non_positive_capital() {
        let config = EngineConfig {
            initial_capital: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }
}
