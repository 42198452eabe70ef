//! Backtest runner — wires together config, engine, and metrics.
//!
//! `run_backtest()` is the single entry point: a validated config plus the
//! three data sources in, a complete `BacktestResult` out. The sweep and the
//! CLI both go through it.

use crate::config::RunnerConfig;
use crate::metrics::PerformanceMetrics;
use crate::result::{BacktestResult, SCHEMA_VERSION};
use siglab_core::data::{FundamentalSource, MarketDataSource, NewsSentimentSource};
use siglab_core::engine::{BacktestEngine, InvalidEngineConfig};
use siglab_core::risk::{InvalidRiskConfig, RiskManager};
use siglab_core::traders::TraderSet;
use thiserror::Error;
use tracing::info;

/// Errors from the runner. Construction-time only: once the engine starts,
/// data problems degrade inside the loop instead of surfacing here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("risk config error: {0}")]
    Risk(#[from] InvalidRiskConfig),
    #[error("engine config error: {0}")]
    Engine(#[from] InvalidEngineConfig),
}

/// Run one backtest and reduce its output to a result.
pub fn run_backtest(
    config: &RunnerConfig,
    market: &dyn MarketDataSource,
    news: &dyn NewsSentimentSource,
    fundamentals: &dyn FundamentalSource,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let risk = RiskManager::new(config.risk)?;
    let engine = BacktestEngine::new(
        market,
        news,
        fundamentals,
        TraderSet::with_defaults(),
        risk,
        config.engine_config(),
    )?;

    let bt = &config.backtest;
    let output = engine.run(
        &bt.symbols,
        bt.start_date,
        bt.end_date,
        bt.strategy,
        bt.commission_rate,
    );

    let metrics =
        PerformanceMetrics::compute(&output.equity_curve, &output.trades, output.initial_capital);
    let equity: Vec<f64> = output.equity_curve.iter().map(|s| s.equity).collect();
    let daily_returns = crate::metrics::daily_returns(&equity);
    info!(
        strategy = %bt.strategy,
        total_return_pct = metrics.total_return_pct,
        sharpe = metrics.sharpe,
        trades = metrics.trade_count,
        "run finished"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        strategy: bt.strategy,
        symbols: bt.symbols.clone(),
        start_date: bt.start_date,
        end_date: bt.end_date,
        initial_capital: output.initial_capital,
        commission_rate: bt.commission_rate,
        metrics,
        daily_returns,
        equity_curve: output.equity_curve,
        trades: output.trades,
        strategy_performance: output.strategy_performance,
        risk_report: output.risk_report,
    })
}
