//! EquitySnapshot — one point on the equity curve.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Portfolio value at the end of one simulated calendar day.
///
/// The identity `equity == cash + positions_value` must hold for every
/// snapshot; the engine records exactly one snapshot per distinct day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquitySnapshot {
    pub date: NaiveDate,
    pub equity: f64,
    pub cash: f64,
    pub positions_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_identity() {
        let snap = EquitySnapshot {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            equity: 101_000.0,
            cash: 90_000.0,
            positions_value: 11_000.0,
        };
        assert_eq!(snap.equity, snap.cash + snap.positions_value);
    }
}
