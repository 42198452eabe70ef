//! Momentum trader — trailing returns confirmed by volume expansion.

use super::Trader;
use crate::domain::{MarketSnapshot, Signal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunable parameters for [`MomentumTrader`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumParams {
    /// Trailing window for mean return and mean volume ratio, in days.
    pub lookback: usize,
    /// Window for the average-volume baseline, in days.
    pub volume_window: usize,
    /// Mean volume ratio must exceed this for a signal to fire.
    pub volume_threshold: f64,
    /// Mean return beyond +/- this fires Buy/Sell.
    pub momentum_threshold: f64,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self {
            lookback: 5,
            volume_window: 20,
            volume_threshold: 1.3,
            momentum_threshold: 0.01,
        }
    }
}

/// Buys when the trailing mean return is above +1% on expanded volume,
/// sells when it is below -1% under the same volume condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumTrader {
    pub params: MomentumParams,
}

impl MomentumTrader {
    pub fn new(params: MomentumParams) -> Self {
        Self { params }
    }

    /// Mean ratio of each recent day's volume to its trailing average.
    ///
    /// For bar `i` (newest-first) the baseline is the `volume_window` bars
    /// ending at `i`. Returns None when the history is too short.
    fn mean_volume_ratio(&self, snapshot: &MarketSnapshot) -> Option<f64> {
        let p = &self.params;
        let bars = &snapshot.bars;
        if bars.len() < p.lookback + p.volume_window {
            return None;
        }
        let mut sum = 0.0;
        for i in 0..p.lookback {
            let window = &bars[i..i + p.volume_window];
            let avg = window.iter().map(|b| b.volume).sum::<f64>() / p.volume_window as f64;
            if avg <= 0.0 {
                return None;
            }
            sum += bars[i].volume / avg;
        }
        Some(sum / p.lookback as f64)
    }
}

impl Trader for MomentumTrader {
    fn evaluate(&self, snapshot: &MarketSnapshot) -> Signal {
        let p = &self.params;
        let returns = snapshot.returns();
        if returns.len() < p.lookback {
            debug!(symbol = %snapshot.symbol, "momentum: not enough return history");
            return Signal::Hold;
        }
        let Some(volume_ratio) = self.mean_volume_ratio(snapshot) else {
            debug!(symbol = %snapshot.symbol, "momentum: not enough volume history");
            return Signal::Hold;
        };

        let momentum = returns[..p.lookback].iter().sum::<f64>() / p.lookback as f64;
        let volume_ok = volume_ratio > p.volume_threshold;
        debug!(
            symbol = %snapshot.symbol,
            momentum, volume_ratio, volume_ok, "momentum evaluation"
        );

        if momentum > p.momentum_threshold && volume_ok {
            Signal::Buy
        } else if momentum < -p.momentum_threshold && volume_ok {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &'static str {
        "momentum"
    }
}
