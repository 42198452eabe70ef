//! MarketSnapshot — everything a trader may see for one symbol on one day.

use super::bar::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scored news article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsScore {
    pub date: NaiveDate,
    /// Polarity in [-1, 1].
    pub polarity: f64,
}

/// One fundamentals report: valuation/growth ratios keyed by name.
///
/// Recognized keys: `pe_ratio`, `revenue_growth`, `earnings_growth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalReport {
    pub date: NaiveDate,
    pub ratios: BTreeMap<String, f64>,
}

impl FundamentalReport {
    pub fn ratio(&self, name: &str) -> Option<f64> {
        self.ratios.get(name).copied()
    }
}

/// Immutable per-symbol view handed to traders.
///
/// All sequences are newest-first, as delivered by the providers. Traders are
/// pure functions over this struct: same snapshot, same signal.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub symbol: String,
    /// Daily bars, newest-first.
    pub bars: Vec<Bar>,
    /// Recent scored articles, newest-first.
    pub sentiment: Vec<NewsScore>,
    /// Fundamentals reports, newest-first.
    pub fundamentals: Vec<FundamentalReport>,
}

impl MarketSnapshot {
    /// Latest close, if any bar exists.
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.first().map(|b| b.close)
    }

    /// Most recent fundamentals report, if any.
    pub fn latest_fundamentals(&self) -> Option<&FundamentalReport> {
        self.fundamentals.first()
    }

    /// Daily close-to-close returns, newest-first.
    ///
    /// `returns()[0]` is the return from yesterday's close to the latest one.
    pub fn returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .filter(|w| w[1].close != 0.0)
            .map(|w| w[0].close / w[1].close - 1.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars_newest_first(closes: &[f64]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                symbol: "AAPL".into(),
                date: base - chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn latest_close_is_first_bar() {
        let snap = MarketSnapshot {
            symbol: "AAPL".into(),
            bars: bars_newest_first(&[103.0, 101.0, 100.0]),
            ..Default::default()
        };
        assert_eq!(snap.latest_close(), Some(103.0));
    }

    #[test]
    fn returns_are_newest_first() {
        let snap = MarketSnapshot {
            symbol: "AAPL".into(),
            bars: bars_newest_first(&[110.0, 100.0, 80.0]),
            ..Default::default()
        };
        let returns = snap.returns();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn empty_snapshot_has_no_close() {
        let snap = MarketSnapshot::default();
        assert_eq!(snap.latest_close(), None);
        assert!(snap.returns().is_empty());
    }
}
