//! Ledger — single owner of capital, open positions, and the trade log.
//!
//! The engine holds the ledger exclusively for the duration of a run; nothing
//! else can mutate positions or cash. The accounting identity
//! `equity == cash + sum(position market values)` holds after every call.

use crate::domain::{Position, PositionSide, Trade, TradeSide};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Per-strategy realized pnl and closed-trade count.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub trades: usize,
    pub pnl: f64,
}

/// Cash, open positions, and the append-only trade log.
#[derive(Debug, Clone)]
pub struct Ledger {
    cash: f64,
    initial_capital: f64,
    positions: BTreeMap<String, Position>,
    trades: Vec<Trade>,
    strategy_performance: BTreeMap<String, StrategyPerformance>,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            initial_capital,
            positions: BTreeMap::new(),
            trades: Vec::new(),
            strategy_performance: BTreeMap::new(),
        }
    }

    /// Reset to the initial capital, clearing positions and the trade log.
    pub fn reset(&mut self) {
        self.cash = self.initial_capital;
        self.positions.clear();
        self.trades.clear();
        self.strategy_performance.clear();
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn positions(&self) -> &BTreeMap<String, Position> {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn strategy_performance(&self) -> &BTreeMap<String, StrategyPerformance> {
        &self.strategy_performance
    }

    /// Mark a position to the given price. No-op if the symbol is flat.
    pub fn mark(&mut self, symbol: &str, price: f64) {
        if let Some(pos) = self.positions.get_mut(symbol) {
            pos.mark(price);
        }
    }

    /// Mark-to-market value of all open positions.
    pub fn positions_value(&self) -> f64 {
        self.positions.values().map(|p| p.market_value()).sum()
    }

    /// Total equity: cash plus mark-to-market position value.
    pub fn equity(&self) -> f64 {
        self.cash + self.positions_value()
    }

    /// Execute a buy, opening (or overwriting) the symbol's position.
    ///
    /// A buy that would overdraw cash is rejected outright — never partially
    /// filled. Returns whether the order executed.
    #[allow(clippy::too_many_arguments)]
    pub fn buy(
        &mut self,
        symbol: &str,
        side: PositionSide,
        quantity: f64,
        price: f64,
        date: NaiveDate,
        strategy: &str,
        commission_rate: f64,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> bool {
        if quantity <= 0.0 || price <= 0.0 {
            return false;
        }
        let notional = quantity * price;
        let commission = notional * commission_rate;
        if notional + commission > self.cash {
            debug!(symbol, notional, cash = self.cash, "buy rejected: insufficient capital");
            return false;
        }

        self.cash -= notional + commission;
        self.positions.insert(
            symbol.to_string(),
            Position {
                symbol: symbol.to_string(),
                quantity,
                entry_price: price,
                current_price: price,
                side,
                opened: date,
                stop_loss,
                take_profit,
            },
        );
        self.trades.push(Trade {
            symbol: symbol.to_string(),
            side: TradeSide::Buy,
            quantity,
            price,
            date,
            strategy: strategy.to_string(),
            pnl: 0.0,
            commission,
        });

        debug!(symbol, quantity, price, "buy executed");
        true
    }

    /// Execute a sell, closing the symbol's position entirely.
    ///
    /// A sell with no open position is a logged no-op. Returns the realized
    /// pnl when a position was closed.
    pub fn sell(
        &mut self,
        symbol: &str,
        price: f64,
        date: NaiveDate,
        strategy: &str,
        commission_rate: f64,
    ) -> Option<f64> {
        let Some(position) = self.positions.remove(symbol) else {
            warn!(symbol, "sell with no open position; ignored");
            return None;
        };

        let pnl = match position.side {
            PositionSide::Long => (price - position.entry_price) * position.quantity,
            PositionSide::Short => (position.entry_price - price) * position.quantity,
        };
        let notional = position.quantity * price;
        let commission = notional * commission_rate;

        self.cash += notional - commission;
        self.trades.push(Trade {
            symbol: symbol.to_string(),
            side: TradeSide::Sell,
            quantity: position.quantity,
            price,
            date,
            strategy: strategy.to_string(),
            pnl,
            commission,
        });

        let perf = self
            .strategy_performance
            .entry(strategy.to_string())
            .or_default();
        perf.trades += 1;
        perf.pnl += pnl;

        debug!(symbol, quantity = position.quantity, price, pnl, "sell executed");
        Some(pnl)
    }
}
