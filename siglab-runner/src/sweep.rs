//! Strategy comparison — the same run repeated across every strategy.
//!
//! Each strategy is an independent deterministic run over the same data, so
//! the sweep fans out across a rayon thread pool and joins the results into
//! a ranked table.

use crate::config::RunnerConfig;
use crate::result::BacktestResult;
use crate::runner::{run_backtest, RunError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use siglab_core::data::{FundamentalSource, MarketDataSource, NewsSentimentSource};
use siglab_core::domain::StrategyId;

/// One row of the comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub strategy: StrategyId,
    pub total_return_pct: f64,
    pub sharpe: f64,
    pub max_drawdown_pct: f64,
    pub win_rate: f64,
    pub trade_count: usize,
    pub final_equity: f64,
}

impl ComparisonEntry {
    fn from_result(result: &BacktestResult) -> Self {
        Self {
            strategy: result.strategy,
            total_return_pct: result.metrics.total_return_pct,
            sharpe: result.metrics.sharpe,
            max_drawdown_pct: result.metrics.max_drawdown_pct,
            win_rate: result.metrics.win_rate,
            trade_count: result.metrics.trade_count,
            final_equity: result.metrics.final_equity,
        }
    }
}

/// Full output of a comparison sweep: ranked summary plus the per-strategy
/// results behind it.
#[derive(Debug)]
pub struct Comparison {
    /// Entries sorted by Sharpe, best first.
    pub ranking: Vec<ComparisonEntry>,
    pub results: Vec<BacktestResult>,
}

/// Run every strategy over the same config and data, in parallel.
///
/// The configured strategy field is ignored; each worker substitutes its own.
pub fn compare_strategies<S>(config: &RunnerConfig, source: &S) -> Result<Comparison, RunError>
where
    S: MarketDataSource + NewsSentimentSource + FundamentalSource,
{
    config.validate()?;

    let mut results: Vec<BacktestResult> = StrategyId::ALL
        .par_iter()
        .map(|&strategy| {
            let mut run_config = config.clone();
            run_config.backtest.strategy = strategy;
            run_backtest(&run_config, source, source, source)
        })
        .collect::<Result<_, _>>()?;

    // Deterministic ranking: Sharpe descending, strategy name as tiebreaker.
    results.sort_by(|a, b| {
        b.metrics
            .sharpe
            .partial_cmp(&a.metrics.sharpe)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.strategy.as_str().cmp(b.strategy.as_str()))
    });

    let ranking = results.iter().map(ComparisonEntry::from_result).collect();
    Ok(Comparison { ranking, results })
}
