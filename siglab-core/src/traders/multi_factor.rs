//! Multi-factor trader — weighted blend of the other four variants.

use super::{
    FundamentalTrader, MeanReversionTrader, MomentumTrader, SentimentTrader, Trader,
};
use crate::domain::{MarketSnapshot, Signal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Factor weights for [`MultiFactorTrader`].
///
/// The technical sub-score is the mean of the momentum and mean-reversion
/// scores; the weighted sum decides at +/- `decision_threshold`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiFactorParams {
    pub technical_weight: f64,
    pub fundamental_weight: f64,
    pub sentiment_weight: f64,
    pub decision_threshold: f64,
}

impl Default for MultiFactorParams {
    fn default() -> Self {
        Self {
            technical_weight: 0.4,
            fundamental_weight: 0.3,
            sentiment_weight: 0.3,
            decision_threshold: 0.3,
        }
    }
}

/// Combines momentum, mean-reversion, fundamental, and sentiment signals
/// into one weighted score.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiFactorTrader {
    pub params: MultiFactorParams,
    momentum: MomentumTrader,
    mean_reversion: MeanReversionTrader,
    fundamental: FundamentalTrader,
    sentiment: SentimentTrader,
}

impl MultiFactorTrader {
    pub fn new(params: MultiFactorParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// The weighted score before thresholding. Exposed for diagnostics.
    pub fn weighted_score(&self, snapshot: &MarketSnapshot) -> f64 {
        let p = &self.params;
        let technical = (self.momentum.evaluate(snapshot).score()
            + self.mean_reversion.evaluate(snapshot).score())
            / 2.0;
        technical * p.technical_weight
            + self.fundamental.evaluate(snapshot).score() * p.fundamental_weight
            + self.sentiment.evaluate(snapshot).score() * p.sentiment_weight
    }
}

impl Trader for MultiFactorTrader {
    fn evaluate(&self, snapshot: &MarketSnapshot) -> Signal {
        let score = self.weighted_score(snapshot);
        debug!(symbol = %snapshot.symbol, score, "multifactor evaluation");

        if score > self.params.decision_threshold {
            Signal::Buy
        } else if score < -self.params.decision_threshold {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &'static str {
        "multifactor"
    }
}
