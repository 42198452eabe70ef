//! Data access — read-only collaborator traits, retry policy, and the
//! in-memory fixture source.
//!
//! Data acquisition (downloads, databases, news APIs) lives outside the core;
//! the engine only ever sees the three provider traits defined here.

pub mod memory;
pub mod provider;
pub mod retry;

pub use memory::MemorySource;
pub use provider::{DataError, FundamentalSource, MarketDataSource, NewsSentimentSource};
pub use retry::{with_retry, RetryPolicy};
