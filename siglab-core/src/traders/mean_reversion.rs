//! Mean-reversion trader — fade deviations from the moving average.

use super::Trader;
use crate::domain::{MarketSnapshot, Signal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunable parameters for [`MeanReversionTrader`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionParams {
    /// Moving-average window, in days.
    pub ma_period: usize,
    /// Fractional deviation beyond which the signal fires.
    pub deviation_threshold: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            ma_period: 20,
            deviation_threshold: 0.03,
        }
    }
}

/// Buys when the latest close sits below its moving average by more than the
/// threshold, sells when it sits above by more than the threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversionTrader {
    pub params: MeanReversionParams,
}

impl MeanReversionTrader {
    pub fn new(params: MeanReversionParams) -> Self {
        Self { params }
    }
}

impl Trader for MeanReversionTrader {
    fn evaluate(&self, snapshot: &MarketSnapshot) -> Signal {
        let p = &self.params;
        if snapshot.bars.len() < p.ma_period {
            debug!(symbol = %snapshot.symbol, "mean_reversion: not enough bars");
            return Signal::Hold;
        }
        let latest = snapshot.bars[0].close;
        let ma = snapshot.bars[..p.ma_period]
            .iter()
            .map(|b| b.close)
            .sum::<f64>()
            / p.ma_period as f64;
        if ma == 0.0 {
            return Signal::Hold;
        }

        let deviation = (latest - ma) / ma;
        debug!(symbol = %snapshot.symbol, deviation, "mean_reversion evaluation");

        if deviation < -p.deviation_threshold {
            Signal::Buy
        } else if deviation > p.deviation_threshold {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &'static str {
        "mean_reversion"
    }
}
