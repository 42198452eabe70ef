//! Fundamental trader — valuation versus growth.

use super::Trader;
use crate::domain::{MarketSnapshot, Signal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunable parameters for [`FundamentalTrader`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalParams {
    /// Buy only below this P/E.
    pub pe_threshold_low: f64,
    /// Sell above this P/E.
    pub pe_threshold_high: f64,
    /// Revenue and earnings growth must both exceed this for a buy.
    pub growth_threshold: f64,
}

impl Default for FundamentalParams {
    fn default() -> Self {
        Self {
            pe_threshold_low: 20.0,
            pe_threshold_high: 35.0,
            growth_threshold: 0.05,
        }
    }
}

/// Buys cheap growers (low P/E, growing revenue and earnings), sells
/// stretched valuations (high P/E). Any missing ratio yields Hold.
#[derive(Debug, Clone, Copy, Default)]
pub struct FundamentalTrader {
    pub params: FundamentalParams,
}

impl FundamentalTrader {
    pub fn new(params: FundamentalParams) -> Self {
        Self { params }
    }
}

impl Trader for FundamentalTrader {
    fn evaluate(&self, snapshot: &MarketSnapshot) -> Signal {
        let p = &self.params;
        let Some(latest) = snapshot.latest_fundamentals() else {
            debug!(symbol = %snapshot.symbol, "fundamental: no reports");
            return Signal::Hold;
        };
        let (Some(pe), Some(rev_growth), Some(earn_growth)) = (
            latest.ratio("pe_ratio"),
            latest.ratio("revenue_growth"),
            latest.ratio("earnings_growth"),
        ) else {
            debug!(symbol = %snapshot.symbol, "fundamental: missing ratio");
            return Signal::Hold;
        };

        debug!(symbol = %snapshot.symbol, pe, rev_growth, earn_growth, "fundamental evaluation");

        if pe < p.pe_threshold_low
            && rev_growth > p.growth_threshold
            && earn_growth > p.growth_threshold
        {
            Signal::Buy
        } else if pe > p.pe_threshold_high {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &'static str {
        "fundamental"
    }
}
