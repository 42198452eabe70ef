//! Serializable run configuration, loaded from TOML.
//!
//! A `RunnerConfig` captures everything needed to reproduce a run: universe,
//! date range, strategy, capital, commission, risk limits, and engine
//! lookbacks. Its blake3 fingerprint names the run's artifact directory, so
//! identical configs land in the same place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use siglab_core::domain::StrategyId;
use siglab_core::engine::EngineConfig;
use siglab_core::risk::RiskConfig;
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("symbols list must not be empty")]
    EmptyUniverse,
    #[error("start_date {start} is after end_date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
    #[error("initial_capital must be positive, got {0}")]
    InitialCapital(f64),
    #[error("commission_rate must be in [0, 1), got {0}")]
    CommissionRate(f64),
}

/// Top-level configuration for one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub engine: EngineSection,
}

/// The `[backtest]` section: what to run, over which dates and symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_strategy")]
    pub strategy: StrategyId,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
}

fn default_strategy() -> StrategyId {
    StrategyId::Ensemble
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_commission_rate() -> f64 {
    0.001
}

/// The `[engine]` section: history lookbacks per provider call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub bar_lookback: usize,
    pub news_lookback: usize,
    pub fundamental_lookback: usize,
    pub volatility_window: usize,
    pub correlation_window: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        Self {
            bar_lookback: defaults.bar_lookback,
            news_lookback: defaults.news_lookback,
            fundamental_lookback: defaults.fundamental_lookback,
            volatility_window: defaults.volatility_window,
            correlation_window: defaults.correlation_window,
        }
    }
}

impl RunnerConfig {
    /// Parse and validate a TOML config string.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bt = &self.backtest;
        if bt.symbols.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if bt.start_date > bt.end_date {
            return Err(ConfigError::InvertedDateRange {
                start: bt.start_date,
                end: bt.end_date,
            });
        }
        if bt.initial_capital <= 0.0 {
            return Err(ConfigError::InitialCapital(bt.initial_capital));
        }
        if !(0.0..1.0).contains(&bt.commission_rate) {
            return Err(ConfigError::CommissionRate(bt.commission_rate));
        }
        Ok(())
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs get the same RunId, so their artifacts
    /// land in the same directory.
    pub fn run_id(&self) -> RunId {
        // Serialization of a validated config cannot fail: all fields are
        // plain data with no map keys beyond strings.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Lower the `[engine]` section into the engine's own config type.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            initial_capital: self.backtest.initial_capital,
            bar_lookback: self.engine.bar_lookback,
            news_lookback: self.engine.news_lookback,
            fundamental_lookback: self.engine.fundamental_lookback,
            volatility_window: self.engine.volatility_window,
            correlation_window: self.engine.correlation_window,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [backtest]
        symbols = ["AAPL", "MSFT"]
        start_date = "2024-01-02"
        end_date = "2024-06-28"
    "#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = RunnerConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.backtest.strategy, StrategyId::Ensemble);
        assert_eq!(config.backtest.initial_capital, 100_000.0);
        assert_eq!(config.backtest.commission_rate, 0.001);
        assert_eq!(config.risk.max_positions, 10);
        assert_eq!(config.engine.bar_lookback, 100);
    }

    #[test]
    fn explicit_sections_override_defaults() {
        let text = r#"
            [backtest]
            symbols = ["AAPL"]
            start_date = "2024-01-02"
            end_date = "2024-02-01"
            strategy = "momentum"
            initial_capital = 50000.0
            commission_rate = 0.002

            [risk]
            max_positions = 3
            stop_loss_pct = 0.08

            [engine]
            bar_lookback = 60
        "#;
        let config = RunnerConfig::from_toml(text).unwrap();
        assert_eq!(config.backtest.strategy, StrategyId::Momentum);
        assert_eq!(config.risk.max_positions, 3);
        assert_eq!(config.risk.stop_loss_pct, 0.08);
        // Unset risk fields keep their defaults.
        assert_eq!(config.risk.take_profit_pct, 0.15);
        assert_eq!(config.engine.bar_lookback, 60);
    }

    #[test]
    fn empty_universe_is_rejected() {
        let text = MINIMAL.replace(r#"["AAPL", "MSFT"]"#, "[]");
        assert!(matches!(
            RunnerConfig::from_toml(&text),
            Err(ConfigError::EmptyUniverse)
        ));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let text = MINIMAL.replace("2024-06-28", "2023-01-02");
        assert!(matches!(
            RunnerConfig::from_toml(&text),
            Err(ConfigError::InvertedDateRange { .. })
        ));
    }

    #[test]
    fn run_id_is_deterministic_and_config_sensitive() {
        let a = RunnerConfig::from_toml(MINIMAL).unwrap();
        let b = RunnerConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(a.run_id(), b.run_id());

        let mut c = RunnerConfig::from_toml(MINIMAL).unwrap();
        c.backtest.strategy = StrategyId::Momentum;
        assert_ne!(a.run_id(), c.run_id());
    }

    #[test]
    fn bad_strategy_name_fails_to_parse() {
        let text = format!("{MINIMAL}\n");
        let text = text.replace(
            "end_date = \"2024-06-28\"",
            "end_date = \"2024-06-28\"\nstrategy = \"oracle\"",
        );
        assert!(matches!(
            RunnerConfig::from_toml(&text),
            Err(ConfigError::Parse(_))
        ));
    }
}
