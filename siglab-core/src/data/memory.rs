//! In-memory data source backing tests and the CLI's CSV loader.

use super::provider::{DataError, FundamentalSource, MarketDataSource, NewsSentimentSource};
use crate::domain::{Bar, FundamentalReport, NewsScore};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Holds per-symbol bars, news scores, and fundamentals reports.
///
/// Insertion order does not matter; bars are kept sorted newest-first so
/// lookups match the provider contract. Implements all three source traits,
/// so one instance can back an entire backtest.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    bars: HashMap<String, Vec<Bar>>,
    sentiment: HashMap<String, Vec<NewsScore>>,
    fundamentals: HashMap<String, Vec<FundamentalReport>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bars(&mut self, symbol: &str, mut bars: Vec<Bar>) {
        let entry = self.bars.entry(symbol.to_string()).or_default();
        entry.append(&mut bars);
        entry.sort_by(|a, b| b.date.cmp(&a.date));
    }

    pub fn add_sentiment(&mut self, symbol: &str, mut scores: Vec<NewsScore>) {
        let entry = self.sentiment.entry(symbol.to_string()).or_default();
        entry.append(&mut scores);
        entry.sort_by(|a, b| b.date.cmp(&a.date));
    }

    pub fn add_fundamentals(&mut self, symbol: &str, mut reports: Vec<FundamentalReport>) {
        let entry = self.fundamentals.entry(symbol.to_string()).or_default();
        entry.append(&mut reports);
        entry.sort_by(|a, b| b.date.cmp(&a.date));
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.bars.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl MarketDataSource for MemorySource {
    fn bars(&self, symbol: &str, asof: NaiveDate, limit: usize) -> Result<Vec<Bar>, DataError> {
        let all = self.bars.get(symbol).ok_or_else(|| DataError::Unavailable {
            symbol: symbol.to_string(),
        })?;
        Ok(all
            .iter()
            .filter(|b| b.date <= asof)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl NewsSentimentSource for MemorySource {
    fn sentiment(&self, symbol: &str, limit: usize) -> Result<Vec<NewsScore>, DataError> {
        Ok(self
            .sentiment
            .get(symbol)
            .map(|scores| scores.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

impl FundamentalSource for MemorySource {
    fn metrics(&self, symbol: &str, limit: usize) -> Result<Vec<FundamentalReport>, DataError> {
        Ok(self
            .fundamentals
            .get(symbol)
            .map(|reports| reports.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
