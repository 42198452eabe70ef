//! Domain types shared across the engine, risk manager, and runner.

pub mod bar;
pub mod equity;
pub mod position;
pub mod signal;
pub mod snapshot;
pub mod trade;

pub use bar::Bar;
pub use equity::EquitySnapshot;
pub use position::{Position, PositionSide};
pub use signal::{Signal, StrategyId};
pub use snapshot::{FundamentalReport, MarketSnapshot, NewsScore};
pub use trade::{Trade, TradeSide};
