//! Artifact export: persist a run's result under its run-id directory.
//!
//! Layout:
//! ```text
//! <output_dir>/<run_id>/
//!   result.json    complete BacktestResult
//!   equity.csv     date,equity,cash,positions_value
//!   trades.csv     date,symbol,side,quantity,price,pnl,commission,strategy
//! ```

use crate::result::BacktestResult;
use crate::sweep::Comparison;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths written for one run.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub result_json: PathBuf,
    pub equity_csv: PathBuf,
    pub trades_csv: PathBuf,
}

/// Write all artifacts for one run. Creates the directory tree as needed.
pub fn save_artifacts(output_dir: impl AsRef<Path>, result: &BacktestResult) -> Result<ArtifactPaths> {
    let run_dir = output_dir.as_ref().join(&result.run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create run directory {}", run_dir.display()))?;

    let result_json = run_dir.join("result.json");
    let json = serde_json::to_string_pretty(result).context("failed to serialize result")?;
    std::fs::write(&result_json, json)
        .with_context(|| format!("failed to write {}", result_json.display()))?;

    let equity_csv = run_dir.join("equity.csv");
    write_equity_csv(&equity_csv, result)?;

    let trades_csv = run_dir.join("trades.csv");
    write_trades_csv(&trades_csv, result)?;

    info!(run_dir = %run_dir.display(), "artifacts written");
    Ok(ArtifactPaths {
        run_dir,
        result_json,
        equity_csv,
        trades_csv,
    })
}

/// Write the comparison ranking as `comparison.json` in `output_dir`.
pub fn save_comparison(output_dir: impl AsRef<Path>, comparison: &Comparison) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir.as_ref()).with_context(|| {
        format!(
            "failed to create output directory {}",
            output_dir.as_ref().display()
        )
    })?;
    let path = output_dir.as_ref().join("comparison.json");
    let json =
        serde_json::to_string_pretty(&comparison.ranking).context("failed to serialize ranking")?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn write_equity_csv(path: &Path, result: &BacktestResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["date", "equity", "cash", "positions_value"])?;
    for snap in &result.equity_curve {
        writer.write_record([
            snap.date.to_string(),
            format!("{:.2}", snap.equity),
            format!("{:.2}", snap.cash),
            format!("{:.2}", snap.positions_value),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_trades_csv(path: &Path, result: &BacktestResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record([
        "date", "symbol", "side", "quantity", "price", "pnl", "commission", "strategy",
    ])?;
    for trade in &result.trades {
        writer.write_record([
            trade.date.to_string(),
            trade.symbol.clone(),
            format!("{:?}", trade.side).to_uppercase(),
            format!("{:.6}", trade.quantity),
            format!("{:.4}", trade.price),
            format!("{:.4}", trade.pnl),
            format!("{:.4}", trade.commission),
            trade.strategy.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PerformanceMetrics;
    use crate::result::SCHEMA_VERSION;
    use chrono::NaiveDate;
    use siglab_core::domain::{EquitySnapshot, StrategyId, Trade, TradeSide};
    use std::collections::BTreeMap;

    fn sample_result() -> BacktestResult {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let equity_curve = vec![EquitySnapshot {
            date,
            equity: 100_000.0,
            cash: 90_000.0,
            positions_value: 10_000.0,
        }];
        let trades = vec![Trade {
            symbol: "AAPL".into(),
            side: TradeSide::Buy,
            quantity: 100.0,
            price: 100.0,
            date,
            strategy: "momentum".into(),
            pnl: 0.0,
            commission: 10.0,
        }];
        BacktestResult {
            schema_version: SCHEMA_VERSION,
            run_id: "testrun".into(),
            strategy: StrategyId::Momentum,
            symbols: vec!["AAPL".into()],
            start_date: date,
            end_date: date,
            initial_capital: 100_000.0,
            commission_rate: 0.001,
            metrics: PerformanceMetrics::compute(&equity_curve, &trades, 100_000.0),
            daily_returns: Vec::new(),
            equity_curve,
            trades,
            strategy_performance: BTreeMap::new(),
            risk_report: None,
        }
    }

    #[test]
    fn save_artifacts_writes_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = save_artifacts(dir.path(), &sample_result()).unwrap();

        assert!(paths.result_json.exists());
        assert!(paths.equity_csv.exists());
        assert!(paths.trades_csv.exists());
        assert!(paths.run_dir.ends_with("testrun"));

        let equity = std::fs::read_to_string(&paths.equity_csv).unwrap();
        assert!(equity.starts_with("date,equity,cash,positions_value"));
        assert!(equity.contains("2024-01-02,100000.00,90000.00,10000.00"));

        let trades = std::fs::read_to_string(&paths.trades_csv).unwrap();
        assert!(trades.contains("2024-01-02,AAPL,BUY,100.000000,100.0000,0.0000,10.0000,momentum"));
    }

    #[test]
    fn result_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let original = sample_result();
        let paths = save_artifacts(dir.path(), &original).unwrap();

        let text = std::fs::read_to_string(&paths.result_json).unwrap();
        let loaded: BacktestResult = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded.run_id, original.run_id);
        assert_eq!(loaded.trades.len(), 1);
        assert_eq!(loaded.metrics, original.metrics);
    }
}
