//! Provider traits and structured error types.
//!
//! The three traits abstract over price, news-sentiment, and fundamentals
//! stores so the engine can run against a database, flat files, or an
//! in-memory fixture without changing. All implementations return sequences
//! newest-first, truncated to `limit`.

use crate::domain::{Bar, FundamentalReport, NewsScore};
use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// No data exists for the symbol/date. Never aborts a run — the engine
    /// skips the symbol for that step.
    #[error("no data for symbol '{symbol}'")]
    Unavailable { symbol: String },

    /// A collaborator (network/API/database) failed. Retried with a bounded
    /// policy, then degraded to an empty result.
    #[error("service error: {0}")]
    Service(String),
}

/// Historical daily bars.
pub trait MarketDataSource: Send + Sync {
    /// Bars for `symbol` dated at or before `asof`, newest-first, at most
    /// `limit` entries.
    fn bars(&self, symbol: &str, asof: NaiveDate, limit: usize) -> Result<Vec<Bar>, DataError>;
}

/// Scored news articles.
pub trait NewsSentimentSource: Send + Sync {
    /// Most recent scored articles for `symbol`, newest-first, at most
    /// `limit` entries.
    fn sentiment(&self, symbol: &str, limit: usize) -> Result<Vec<NewsScore>, DataError>;
}

/// Valuation and growth ratios.
pub trait FundamentalSource: Send + Sync {
    /// Most recent fundamentals reports for `symbol`, newest-first, at most
    /// `limit` entries.
    fn metrics(&self, symbol: &str, limit: usize) -> Result<Vec<FundamentalReport>, DataError>;
}
