//! Risk management — position sizing, trade gating, portfolio risk scoring,
//! and stop-loss/take-profit tracking.

pub mod correlation;
pub mod manager;
pub mod report;

pub use correlation::correlation_score;
pub use manager::{EntryRejection, ExitReason, InvalidRiskConfig, RiskConfig, RiskManager};
pub use report::{PortfolioRisk, RiskLevel};
