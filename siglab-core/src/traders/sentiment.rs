//! Sentiment trader — mean news polarity over recent articles.

use super::Trader;
use crate::domain::{MarketSnapshot, Signal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunable parameters for [`SentimentTrader`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentParams {
    /// Mean polarity beyond +/- this fires Buy/Sell.
    pub sentiment_threshold: f64,
    /// Fewer scored articles than this yields Hold.
    pub min_articles: usize,
}

impl Default for SentimentParams {
    fn default() -> Self {
        Self {
            sentiment_threshold: 0.3,
            min_articles: 2,
        }
    }
}

/// Buys on strongly positive mean polarity, sells on strongly negative.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentTrader {
    pub params: SentimentParams,
}

impl SentimentTrader {
    pub fn new(params: SentimentParams) -> Self {
        Self { params }
    }
}

impl Trader for SentimentTrader {
    fn evaluate(&self, snapshot: &MarketSnapshot) -> Signal {
        let p = &self.params;
        let scores = &snapshot.sentiment;
        if scores.len() < p.min_articles {
            debug!(symbol = %snapshot.symbol, articles = scores.len(), "sentiment: too few articles");
            return Signal::Hold;
        }

        let mean = scores.iter().map(|s| s.polarity).sum::<f64>() / scores.len() as f64;
        debug!(symbol = %snapshot.symbol, mean, "sentiment evaluation");

        if mean > p.sentiment_threshold {
            Signal::Buy
        } else if mean < -p.sentiment_threshold {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &'static str {
        "sentiment"
    }
}
