//! Simulation engine — ledger and the day-by-day backtest loop.

pub mod backtest;
pub mod ledger;

pub use backtest::{BacktestEngine, EngineConfig, InvalidEngineConfig, RunOutput};
pub use ledger::{Ledger, StrategyPerformance};
