//! Risk manager — sizing, gating, scoring, and exit levels.

use super::report::{PortfolioRisk, RiskLevel};
use crate::domain::{Position, PositionSide};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Risk limits and sizing parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Cap on a single position as a fraction of portfolio value.
    pub max_position_pct: f64,
    /// Daily loss beyond this fraction of portfolio value blocks new entries.
    pub max_daily_loss: f64,
    /// Drawdown breach threshold for the risk score.
    pub max_drawdown: f64,
    /// Stop-loss distance from entry, as a fraction.
    pub stop_loss_pct: f64,
    /// Take-profit distance from entry, as a fraction.
    pub take_profit_pct: f64,
    /// Open-position count ceiling.
    pub max_positions: usize,
    /// Estimated win probability for the Kelly fraction.
    pub win_probability: f64,
    /// Entries are blocked above this inter-position correlation.
    pub max_correlation: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_pct: 0.10,
            max_daily_loss: 0.05,
            max_drawdown: 0.15,
            stop_loss_pct: 0.05,
            take_profit_pct: 0.15,
            max_positions: 10,
            win_probability: 0.55,
            max_correlation: 0.7,
        }
    }
}

/// Construction-time validation error for [`RiskConfig`].
#[derive(Debug, Error)]
pub enum InvalidRiskConfig {
    #[error("take_profit_pct must be positive, got {0}")]
    TakeProfit(f64),
    #[error("stop_loss_pct must be positive, got {0}")]
    StopLoss(f64),
    #[error("win_probability must be in (0, 1), got {0}")]
    WinProbability(f64),
    #[error("max_positions must be at least 1")]
    MaxPositions,
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), InvalidRiskConfig> {
        if self.take_profit_pct <= 0.0 {
            return Err(InvalidRiskConfig::TakeProfit(self.take_profit_pct));
        }
        if self.stop_loss_pct <= 0.0 {
            return Err(InvalidRiskConfig::StopLoss(self.stop_loss_pct));
        }
        if self.win_probability <= 0.0 || self.win_probability >= 1.0 {
            return Err(InvalidRiskConfig::WinProbability(self.win_probability));
        }
        if self.max_positions == 0 {
            return Err(InvalidRiskConfig::MaxPositions);
        }
        Ok(())
    }
}

/// Why an entry was rejected by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryRejection {
    MaxPositionsReached,
    CriticalRiskLevel,
    HighRiskLevel,
    DailyLossLimit,
    CorrelationRisk,
}

impl fmt::Display for EntryRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            EntryRejection::MaxPositionsReached => "maximum positions reached",
            EntryRejection::CriticalRiskLevel => "critical risk level - no new trades",
            EntryRejection::HighRiskLevel => "high risk level - only closing positions",
            EntryRejection::DailyLossLimit => "daily loss limit reached",
            EntryRejection::CorrelationRisk => "high correlation risk",
        };
        f.write_str(reason)
    }
}

/// Why a position was force-exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

/// Sizes positions, gates entries, scores portfolio risk, and computes exit
/// levels. Stateless: all portfolio state lives in the ledger and is passed
/// in per call, so the engine remains the single writer.
#[derive(Debug, Clone, Copy)]
pub struct RiskManager {
    config: RiskConfig,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Result<Self, InvalidRiskConfig> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Kelly-derived position size in currency units.
    ///
    /// `f = (p*Rwin - (1-p)*Rloss) / Rwin`, damped by `1/(1 + 10*sigma)`,
    /// capped by the smaller of the per-position limit, the damped Kelly
    /// size, and 10% of portfolio value. Non-positive means "do not trade".
    pub fn position_size(&self, portfolio_value: f64, volatility: f64) -> f64 {
        let c = &self.config;
        let p = c.win_probability;
        let kelly = (p * c.take_profit_pct - (1.0 - p) * c.stop_loss_pct) / c.take_profit_pct;
        let damp = 1.0 / (1.0 + volatility * 10.0);

        let size = (c.max_position_pct * portfolio_value)
            .min(kelly * portfolio_value * damp)
            .min(0.10 * portfolio_value);
        size.max(0.0)
    }

    /// Stop-loss and take-profit levels for an entry, mirrored by side.
    pub fn exit_levels(&self, side: PositionSide, entry_price: f64) -> (f64, f64) {
        let c = &self.config;
        match side {
            PositionSide::Long => (
                entry_price * (1.0 - c.stop_loss_pct),
                entry_price * (1.0 + c.take_profit_pct),
            ),
            PositionSide::Short => (
                entry_price * (1.0 + c.stop_loss_pct),
                entry_price * (1.0 - c.take_profit_pct),
            ),
        }
    }

    /// Whether the position's current mark breaches either exit level.
    ///
    /// Exit checks bypass the entry gate entirely.
    pub fn exit_breach(&self, position: &Position) -> Option<ExitReason> {
        let mark = position.current_price;
        match position.side {
            PositionSide::Long => {
                if position.stop_loss.is_some_and(|sl| mark <= sl) {
                    Some(ExitReason::StopLoss)
                } else if position.take_profit.is_some_and(|tp| mark >= tp) {
                    Some(ExitReason::TakeProfit)
                } else {
                    None
                }
            }
            PositionSide::Short => {
                if position.stop_loss.is_some_and(|sl| mark >= sl) {
                    Some(ExitReason::StopLoss)
                } else if position.take_profit.is_some_and(|tp| mark <= tp) {
                    Some(ExitReason::TakeProfit)
                } else {
                    None
                }
            }
        }
    }

    /// Score the portfolio and classify its risk level.
    ///
    /// `daily_pnl` is the true day-over-day equity delta; `drawdown` is the
    /// current fraction below the running equity peak.
    pub fn assess(
        &self,
        portfolio_value: f64,
        daily_pnl: f64,
        drawdown: f64,
        positions: &BTreeMap<String, Position>,
        correlation_score: f64,
    ) -> PortfolioRisk {
        if positions.is_empty() {
            let mut risk = PortfolioRisk::flat(portfolio_value);
            risk.daily_pnl = daily_pnl;
            risk.drawdown = drawdown;
            return risk;
        }

        let total_pnl: f64 = positions.values().map(|p| p.unrealized_pnl()).sum();
        let values: Vec<f64> = positions.values().map(|p| p.market_value()).collect();
        let volatility = dispersion(&values);

        let daily_return = if portfolio_value > 0.0 {
            daily_pnl / portfolio_value
        } else {
            0.0
        };
        let level = self.risk_level(daily_return, drawdown, volatility, positions.len());

        PortfolioRisk {
            total_value: portfolio_value,
            total_pnl,
            daily_pnl,
            drawdown,
            volatility,
            risk_level: level,
            position_count: positions.len(),
            correlation_score,
        }
    }

    /// Accumulate the four independent risk checks into a level.
    fn risk_level(
        &self,
        daily_return: f64,
        drawdown: f64,
        volatility: f64,
        position_count: usize,
    ) -> RiskLevel {
        let c = &self.config;
        let mut score = 0u32;

        if daily_return.abs() > c.max_daily_loss {
            score += 3;
        } else if daily_return.abs() > c.max_daily_loss * 0.5 {
            score += 1;
        }

        if drawdown.abs() > c.max_drawdown {
            score += 3;
        } else if drawdown.abs() > c.max_drawdown * 0.5 {
            score += 1;
        }

        if volatility > 0.05 {
            score += 2;
        } else if volatility > 0.03 {
            score += 1;
        }

        if position_count > c.max_positions {
            score += 2;
        } else if position_count as f64 > c.max_positions as f64 * 0.8 {
            score += 1;
        }

        RiskLevel::from_score(score)
    }

    /// Gate a new entry. Exits never pass through here.
    ///
    /// Returns the first rejection reason, or None if the entry is approved.
    pub fn gate_entry(&self, risk: &PortfolioRisk) -> Option<EntryRejection> {
        let c = &self.config;

        if risk.position_count >= c.max_positions {
            return Some(EntryRejection::MaxPositionsReached);
        }
        if risk.risk_level == RiskLevel::Critical {
            return Some(EntryRejection::CriticalRiskLevel);
        }
        if risk.risk_level == RiskLevel::High {
            return Some(EntryRejection::HighRiskLevel);
        }
        if risk.daily_pnl < -c.max_daily_loss * risk.total_value {
            return Some(EntryRejection::DailyLossLimit);
        }
        if risk.correlation_score > c.max_correlation {
            return Some(EntryRejection::CorrelationRisk);
        }

        debug!(level = ?risk.risk_level, "entry approved");
        None
    }
}

/// Stdev over mean of position values; 0 with fewer than two values.
fn dispersion(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt() / mean
}
