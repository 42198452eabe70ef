//! Trade — one executed order, append-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Order direction as executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A single executed order.
///
/// Opening trades carry `pnl == 0.0`; closing trades carry the realized pnl.
/// Never mutated after creation — the trade log is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: f64,
    pub price: f64,
    pub date: NaiveDate,
    pub strategy: String,
    pub pnl: f64,
    pub commission: f64,
}

impl Trade {
    /// Whether this is a closing trade (realized pnl recorded).
    pub fn is_close(&self) -> bool {
        self.pnl != 0.0
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
