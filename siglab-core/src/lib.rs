//! SigLab Core — the backtesting simulation engine.
//!
//! This crate contains the heart of the system:
//! - Domain types (bars, positions, trades, equity snapshots, signals)
//! - Read-only data provider traits with bounded-retry degradation
//! - The Trader protocol and its five strategy variants
//! - Risk manager: position sizing, trade gate, risk level, stop/take tracking
//! - Ledger: cash, open positions, append-only trade log
//! - Day-by-day simulation loop with per-day equity snapshots
//!
//! The engine is single-threaded and deterministic: identical inputs produce
//! bit-identical output, which is what makes strategy comparison meaningful.

pub mod data;
pub mod domain;
pub mod engine;
pub mod risk;
pub mod traders;
