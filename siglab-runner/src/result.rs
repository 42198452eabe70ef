//! Persisted result of a backtest run.

use crate::config::RunId;
use crate::metrics::PerformanceMetrics;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use siglab_core::domain::{EquitySnapshot, StrategyId, Trade};
use siglab_core::engine::StrategyPerformance;
use siglab_core::risk::PortfolioRisk;
use std::collections::BTreeMap;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
///
/// Everything needed to reproduce, rank, and report on a run; serialized as
/// `result.json` in the run's artifact directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub strategy: StrategyId,
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub commission_rate: f64,
    pub metrics: PerformanceMetrics,
    /// Day-over-day fractional returns of the equity curve.
    pub daily_returns: Vec<f64>,
    pub equity_curve: Vec<EquitySnapshot>,
    pub trades: Vec<Trade>,
    /// Realized pnl and closed-trade count per strategy name.
    pub strategy_performance: BTreeMap<String, StrategyPerformance>,
    /// Portfolio risk assessment from the last simulated day (None when the
    /// range contained no trading days).
    pub risk_report: Option<PortfolioRisk>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_without_schema_version_gets_the_current_one() {
        let json = r#"{
            "run_id": "abc",
            "strategy": "momentum",
            "symbols": ["AAPL"],
            "start_date": "2024-01-02",
            "end_date": "2024-02-01",
            "initial_capital": 100000.0,
            "commission_rate": 0.001,
            "metrics": {
                "total_return_abs": 0.0,
                "total_return_pct": 0.0,
                "sharpe": 0.0,
                "max_drawdown": 0.0,
                "max_drawdown_pct": 0.0,
                "win_rate": 0.0,
                "trade_count": 0,
                "closed_trades": 0,
                "avg_trade_pnl": 0.0,
                "best_trade": 0.0,
                "worst_trade": 0.0,
                "final_equity": 100000.0
            },
            "daily_returns": [],
            "equity_curve": [],
            "trades": [],
            "strategy_performance": {},
            "risk_report": null
        }"#;
        let result: BacktestResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.schema_version, SCHEMA_VERSION);
        assert_eq!(result.strategy, StrategyId::Momentum);
    }
}
