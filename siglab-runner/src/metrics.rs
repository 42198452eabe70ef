//! Performance metrics — pure functions that compute run statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar
//! out. No dependencies on the runner or the engine.

use serde::{Deserialize, Serialize};
use siglab_core::domain::{EquitySnapshot, Trade};

/// Annualization factor: trading days per year.
const TRADING_DAYS: f64 = 252.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total return in currency units, measured from the first snapshot.
    pub total_return_abs: f64,
    /// Total return as a percentage of the first snapshot's equity.
    pub total_return_pct: f64,
    pub sharpe: f64,
    /// Largest peak-to-trough equity drop, in currency.
    pub max_drawdown: f64,
    /// Largest peak-to-trough drop as a percentage of the peak (0..=100).
    pub max_drawdown_pct: f64,
    /// Percentage of closed trades with positive pnl (0..=100).
    pub win_rate: f64,
    pub trade_count: usize,
    /// Trades that closed a position (nonzero realized pnl).
    pub closed_trades: usize,
    pub avg_trade_pnl: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub final_equity: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from an equity curve and trade list.
    ///
    /// An empty curve yields the zero result rather than NaN.
    pub fn compute(equity_curve: &[EquitySnapshot], trades: &[Trade], initial_capital: f64) -> Self {
        let equity: Vec<f64> = equity_curve.iter().map(|s| s.equity).collect();
        let (dd_abs, dd_pct) = max_drawdown(&equity);
        let closed: Vec<&Trade> = trades.iter().filter(|t| t.is_close()).collect();
        let closed_pnls: Vec<f64> = closed.iter().map(|t| t.pnl).collect();
        let final_eq = equity.last().copied().unwrap_or(initial_capital);
        // Returns are measured from the first snapshot, not from the
        // configured capital: a curve that opens below initial capital is
        // not itself a loss.
        let base = equity.first().copied().unwrap_or(initial_capital);

        Self {
            total_return_abs: final_eq - base,
            total_return_pct: total_return(&equity) * 100.0,
            sharpe: sharpe_ratio(&equity),
            max_drawdown: dd_abs,
            max_drawdown_pct: dd_pct * 100.0,
            win_rate: win_rate(trades) * 100.0,
            trade_count: trades.len(),
            closed_trades: closed.len(),
            avg_trade_pnl: mean(&closed_pnls),
            best_trade: closed_pnls.iter().copied().reduce(f64::max).unwrap_or(0.0),
            worst_trade: closed_pnls.iter().copied().reduce(f64::min).unwrap_or(0.0),
            final_equity: final_eq,
        }
    }
}

/// Total return as a fraction of the first equity point.
pub fn total_return(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let first = equity[0];
    if first <= 0.0 {
        return 0.0;
    }
    (equity[equity.len() - 1] - first) / first
}

/// Day-over-day fractional returns of the equity curve.
pub fn daily_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Annualized Sharpe ratio from daily equity returns.
///
/// Sharpe = mean(returns) / std(returns) * sqrt(252). Returns 0.0 when the
/// curve is too short or the return variance is zero.
pub fn sharpe_ratio(equity: &[f64]) -> f64 {
    let returns = daily_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let m = mean(&returns);
    let sd = std_dev(&returns);
    if sd < 1e-15 {
        return 0.0;
    }
    (m / sd) * TRADING_DAYS.sqrt()
}

/// Maximum drawdown via running peak: (absolute, fraction of peak).
pub fn max_drawdown(equity: &[f64]) -> (f64, f64) {
    let mut peak = f64::MIN;
    let mut worst_abs = 0.0_f64;
    let mut worst_pct = 0.0_f64;
    for &value in equity {
        peak = peak.max(value);
        let abs = peak - value;
        if abs > worst_abs {
            worst_abs = abs;
            worst_pct = if peak > 0.0 { abs / peak } else { 0.0 };
        }
    }
    (worst_abs, worst_pct)
}

/// Fraction of closed trades with positive pnl. 0.0 when nothing closed.
pub fn win_rate(trades: &[Trade]) -> f64 {
    let closed: Vec<&Trade> = trades.iter().filter(|t| t.is_close()).collect();
    if closed.is_empty() {
        return 0.0;
    }
    let winners = closed.iter().filter(|t| t.is_winner()).count();
    winners as f64 / closed.len() as f64
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

/// Population standard deviation.
fn std_dev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    var.sqrt()
}
