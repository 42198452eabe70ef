//! Position — one open holding, at most one per symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

/// An open holding in one symbol.
///
/// Created on entry execution, marked to the day's close on every trading
/// day the symbol has a bar, removed on full exit. Stop-loss and take-profit
/// levels are attached at entry by the risk manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub side: PositionSide,
    pub opened: NaiveDate,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl Position {
    /// Mark-to-market value at the current price.
    pub fn market_value(&self) -> f64 {
        self.quantity * self.current_price
    }

    /// Unrealized pnl at the current mark. Sign-flipped for shorts.
    pub fn unrealized_pnl(&self) -> f64 {
        match self.side {
            PositionSide::Long => (self.current_price - self.entry_price) * self.quantity,
            PositionSide::Short => (self.entry_price - self.current_price) * self.quantity,
        }
    }

    /// Update the mark.
    pub fn mark(&mut self, price: f64) {
        self.current_price = price;
    }
}
