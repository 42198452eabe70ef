//! SigLab Runner — backtest orchestration on top of `siglab-core`.
//!
//! This crate builds on the engine to provide:
//! - TOML run configuration with blake3 content-addressed run ids
//! - Single-backtest runner with metric reduction
//! - Parallel strategy comparison sweep
//! - Artifact export (result.json, equity.csv, trades.csv)

pub mod config;
pub mod export;
pub mod metrics;
pub mod result;
pub mod runner;
pub mod sweep;

pub use config::{BacktestSection, ConfigError, EngineSection, RunId, RunnerConfig};
pub use export::{save_artifacts, save_comparison, ArtifactPaths};
pub use metrics::PerformanceMetrics;
pub use result::{BacktestResult, SCHEMA_VERSION};
pub use runner::{run_backtest, RunError};
pub use sweep::{compare_strategies, Comparison, ComparisonEntry};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn results_cross_thread_boundaries() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
        assert_send::<RunnerConfig>();
        assert_sync::<RunnerConfig>();
    }
}
