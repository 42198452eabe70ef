//! SigLab CLI — run and compare backtests over CSV market data.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config file
//! - `compare` — run every strategy over the same config and rank them
//!
//! Market data is loaded from a directory of per-symbol CSV files:
//! - `<SYMBOL>.csv` — date,open,high,low,close,volume
//! - `<SYMBOL>.sentiment.csv` — date,polarity (optional)
//! - `<SYMBOL>.fundamentals.csv` — date plus one column per ratio (optional)

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use siglab_core::data::MemorySource;
use siglab_core::domain::{Bar, FundamentalReport, NewsScore};
use siglab_runner::{
    compare_strategies, run_backtest, save_artifacts, save_comparison, BacktestResult, Comparison,
    RunnerConfig,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "siglab", about = "SigLab — signal-driven backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Directory of per-symbol CSV data files.
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run every strategy over the same config and rank them by Sharpe.
    Compare {
        /// Path to a TOML config file (its strategy field is ignored).
        #[arg(long)]
        config: PathBuf,

        /// Directory of per-symbol CSV data files.
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Output directory for run artifacts and the ranking.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            data,
            output_dir,
        } => cmd_run(&config, &data, &output_dir),
        Commands::Compare {
            config,
            data,
            output_dir,
        } => cmd_compare(&config, &data, &output_dir),
    }
}

fn cmd_run(config_path: &Path, data_dir: &Path, output_dir: &Path) -> Result<()> {
    let config = RunnerConfig::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let source = load_data_dir(data_dir, &config.backtest.symbols)?;

    let result = run_backtest(&config, &source, &source, &source)?;
    print_summary(&result);

    let paths = save_artifacts(output_dir, &result)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());
    Ok(())
}

fn cmd_compare(config_path: &Path, data_dir: &Path, output_dir: &Path) -> Result<()> {
    let config = RunnerConfig::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let source = load_data_dir(data_dir, &config.backtest.symbols)?;

    let comparison = compare_strategies(&config, &source)?;
    print_ranking(&comparison);

    for result in &comparison.results {
        save_artifacts(output_dir, result)?;
    }
    let path = save_comparison(output_dir, &comparison)?;
    println!("Ranking saved to: {}", path.display());
    Ok(())
}

/// Load bars, sentiment, and fundamentals for every configured symbol.
///
/// Bars are required per symbol; sentiment and fundamentals files are
/// optional and default to empty.
fn load_data_dir(dir: &Path, symbols: &[String]) -> Result<MemorySource> {
    if !dir.exists() {
        bail!("data directory does not exist: {}", dir.display());
    }

    let mut source = MemorySource::new();
    for symbol in symbols {
        let bars_path = dir.join(format!("{symbol}.csv"));
        let bars = load_bars_csv(&bars_path, symbol)
            .with_context(|| format!("failed to load bars from {}", bars_path.display()))?;
        if bars.is_empty() {
            bail!("no bars for symbol {symbol} in {}", bars_path.display());
        }
        info!(symbol, bars = bars.len(), "loaded market data");
        source.add_bars(symbol, bars);

        let sentiment_path = dir.join(format!("{symbol}.sentiment.csv"));
        if sentiment_path.exists() {
            let scores = load_sentiment_csv(&sentiment_path).with_context(|| {
                format!("failed to load sentiment from {}", sentiment_path.display())
            })?;
            source.add_sentiment(symbol, scores);
        }

        let fundamentals_path = dir.join(format!("{symbol}.fundamentals.csv"));
        if fundamentals_path.exists() {
            let reports = load_fundamentals_csv(&fundamentals_path).with_context(|| {
                format!(
                    "failed to load fundamentals from {}",
                    fundamentals_path.display()
                )
            })?;
            source.add_fundamentals(symbol, reports);
        }
    }
    Ok(source)
}

fn load_bars_csv(path: &Path, symbol: &str) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let idx = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| format!("missing column '{name}'"))
    };
    let (date_i, open_i, high_i) = (idx("date")?, idx("open")?, idx("high")?);
    let (low_i, close_i, volume_i) = (idx("low")?, idx("close")?, idx("volume")?);

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record?;
        let bar = Bar {
            symbol: symbol.to_string(),
            date: parse_date(&record[date_i])?,
            open: record[open_i].parse()?,
            high: record[high_i].parse()?,
            low: record[low_i].parse()?,
            close: record[close_i].parse()?,
            volume: record[volume_i].parse()?,
        };
        if !bar.is_sane() {
            bail!("invalid OHLC bar for {symbol} on {}", bar.date);
        }
        bars.push(bar);
    }
    Ok(bars)
}

fn load_sentiment_csv(path: &Path) -> Result<Vec<NewsScore>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let date_i = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date"))
        .context("missing column 'date'")?;
    let polarity_i = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("polarity"))
        .context("missing column 'polarity'")?;

    let mut scores = Vec::new();
    for record in reader.records() {
        let record = record?;
        scores.push(NewsScore {
            date: parse_date(&record[date_i])?,
            polarity: record[polarity_i].parse()?,
        });
    }
    Ok(scores)
}

/// Every non-date column becomes a named ratio, so new fundamentals land in
/// the data files without code changes.
fn load_fundamentals_csv(path: &Path) -> Result<Vec<FundamentalReport>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let date_i = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date"))
        .context("missing column 'date'")?;

    let mut reports = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut ratios = BTreeMap::new();
        for (i, header) in headers.iter().enumerate() {
            if i == date_i || record[i].trim().is_empty() {
                continue;
            }
            ratios.insert(header.to_lowercase(), record[i].parse()?);
        }
        reports.push(FundamentalReport {
            date: parse_date(&record[date_i])?,
            ratios,
        });
    }
    Ok(reports)
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{text}'"))
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    println!();
    println!("Backtest: {} ({})", result.strategy, result.symbols.join(", "));
    println!("Period:   {} to {}", result.start_date, result.end_date);
    println!("{}", "-".repeat(44));
    println!("{:<22} {:>20.2}", "Initial capital", result.initial_capital);
    println!("{:<22} {:>20.2}", "Final equity", m.final_equity);
    println!("{:<22} {:>19.2}%", "Total return", m.total_return_pct);
    println!("{:<22} {:>20.2}", "Sharpe ratio", m.sharpe);
    println!("{:<22} {:>19.2}%", "Max drawdown", m.max_drawdown_pct);
    println!("{:<22} {:>19.2}%", "Win rate", m.win_rate);
    println!("{:<22} {:>20}", "Trades", m.trade_count);
    if let Some(report) = &result.risk_report {
        println!("{:<22} {:>20}", "Final risk level", report.risk_level.to_string());
    }
}

fn print_ranking(comparison: &Comparison) {
    println!();
    println!(
        "{:<16} {:>10} {:>9} {:>10} {:>9} {:>8}",
        "Strategy", "Return", "Sharpe", "Drawdown", "WinRate", "Trades"
    );
    println!("{}", "-".repeat(68));
    for entry in &comparison.ranking {
        println!(
            "{:<16} {:>9.2}% {:>9.2} {:>9.2}% {:>8.1}% {:>8}",
            entry.strategy.as_str(),
            entry.total_return_pct,
            entry.sharpe,
            entry.max_drawdown_pct,
            entry.win_rate,
            entry.trade_count,
        );
    }
}
