//! Signal and strategy identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete strategy output for one symbol on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Map to a score for weighted combination: Buy=+1, Sell=-1, Hold=0.
    pub fn score(self) -> f64 {
        match self {
            Signal::Buy => 1.0,
            Signal::Sell => -1.0,
            Signal::Hold => 0.0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Which strategy drives a backtest run.
///
/// `Ensemble` is not a trader variant — the engine resolves it as a majority
/// vote across all five variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    Momentum,
    MeanReversion,
    Sentiment,
    Fundamental,
    Multifactor,
    Ensemble,
}

impl StrategyId {
    pub const ALL: [StrategyId; 6] = [
        StrategyId::Momentum,
        StrategyId::MeanReversion,
        StrategyId::Sentiment,
        StrategyId::Fundamental,
        StrategyId::Multifactor,
        StrategyId::Ensemble,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::Momentum => "momentum",
            StrategyId::MeanReversion => "mean_reversion",
            StrategyId::Sentiment => "sentiment",
            StrategyId::Fundamental => "fundamental",
            StrategyId::Multifactor => "multifactor",
            StrategyId::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "momentum" => Ok(StrategyId::Momentum),
            "mean_reversion" => Ok(StrategyId::MeanReversion),
            "sentiment" => Ok(StrategyId::Sentiment),
            "fundamental" => Ok(StrategyId::Fundamental),
            "multifactor" => Ok(StrategyId::Multifactor),
            "ensemble" => Ok(StrategyId::Ensemble),
            other => Err(format!(
                "unknown strategy '{other}'. Valid: momentum, mean_reversion, sentiment, fundamental, multifactor, ensemble"
            )),
        }
    }
}
