//! Portfolio risk report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal classification of portfolio risk exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map an accumulated risk score to a level.
    ///
    /// 0-1 LOW, 2-3 MEDIUM, 4-5 HIGH, 6+ CRITICAL.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=1 => RiskLevel::Low,
            2..=3 => RiskLevel::Medium,
            4..=5 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(text)
    }
}

/// Point-in-time portfolio risk summary.
///
/// Produced by the risk manager each simulated day and exported with run
/// artifacts. `daily_pnl` is the true day-over-day equity delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRisk {
    pub total_value: f64,
    /// Total unrealized pnl across open positions.
    pub total_pnl: f64,
    /// Day-over-day equity delta.
    pub daily_pnl: f64,
    /// Current drawdown from the running equity peak, as a fraction.
    pub drawdown: f64,
    /// Dispersion of position values: stdev / mean, 0 with fewer than two positions.
    pub volatility: f64,
    pub risk_level: RiskLevel,
    pub position_count: usize,
    /// Mean absolute pairwise correlation of open-position returns.
    pub correlation_score: f64,
}

impl PortfolioRisk {
    /// A flat portfolio: no positions, no risk.
    pub fn flat(total_value: f64) -> Self {
        Self {
            total_value,
            total_pnl: 0.0,
            daily_pnl: 0.0,
            drawdown: 0.0,
            volatility: 0.0,
            risk_level: RiskLevel::Low,
            position_count: 0,
            correlation_score: 0.0,
        }
    }
}
