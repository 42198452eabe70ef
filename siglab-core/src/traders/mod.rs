//! Trader protocol — pure signal generation over a market snapshot.
//!
//! Traders must NEVER see ledger state (positions, cash, equity). They are
//! pure functions of the snapshot: same data in, same signal out. Missing or
//! insufficient data degrades to `Hold`, logged, never propagated.

pub mod fundamental;
pub mod mean_reversion;
pub mod momentum;
pub mod multi_factor;
pub mod sentiment;

pub use fundamental::FundamentalTrader;
pub use mean_reversion::MeanReversionTrader;
pub use momentum::MomentumTrader;
pub use multi_factor::MultiFactorTrader;
pub use sentiment::SentimentTrader;

use crate::domain::{MarketSnapshot, Signal};

/// Pure signal generator for one symbol/day.
///
/// # Invariants
/// - `evaluate()` MUST NOT access ledger or risk state
/// - `evaluate()` MUST be deterministic for the same snapshot
/// - Any data shortfall degrades to `Signal::Hold`
pub trait Trader: Send + Sync {
    /// Convert a data snapshot into a discrete action.
    fn evaluate(&self, snapshot: &MarketSnapshot) -> Signal;

    /// Trader name for the trade log and logging.
    fn name(&self) -> &'static str;
}

/// The full set of trader variants, constructed once and injected into the
/// engine. No global registry — ownership is explicit.
pub struct TraderSet {
    traders: Vec<Box<dyn Trader>>,
}

impl TraderSet {
    /// All five variants with default parameters.
    pub fn with_defaults() -> Self {
        Self {
            traders: vec![
                Box::new(MomentumTrader::default()),
                Box::new(MeanReversionTrader::default()),
                Box::new(SentimentTrader::default()),
                Box::new(FundamentalTrader::default()),
                Box::new(MultiFactorTrader::default()),
            ],
        }
    }

    pub fn from_traders(traders: Vec<Box<dyn Trader>>) -> Self {
        Self { traders }
    }

    /// Look up a variant by name.
    pub fn get(&self, name: &str) -> Option<&dyn Trader> {
        self.traders
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Trader> {
        self.traders.iter().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.traders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }
}

/// Majority vote across a set of signals. A tie yields `Hold`.
pub fn majority_vote(signals: &[Signal]) -> Signal {
    let buys = signals.iter().filter(|&&s| s == Signal::Buy).count();
    let sells = signals.iter().filter(|&&s| s == Signal::Sell).count();
    if buys > sells {
        Signal::Buy
    } else if sells > buys {
        Signal::Sell
    } else {
        Signal::Hold
    }
}
