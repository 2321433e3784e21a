//! Engine statistics snapshot
//!
//! Cumulative counters plus the rolling latency summary, as reported by
//! `stats()` and embedded in the state-sync document.

use serde::{Deserialize, Serialize};

/// Point-in-time engine statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatsSnapshot {
    pub orders_submitted: u64,
    pub orders_canceled: u64,
    pub trades_executed: u64,
    pub rejected_orders: u64,
    pub expired_orders: u64,
    /// Currently resting orders across all books.
    pub active_orders: usize,
    /// Mean submit/cancel latency over the rolling window, microseconds.
    pub avg_latency_us: f64,
    /// 95th percentile latency over the rolling window, microseconds.
    pub p95_latency_us: f64,
}

impl EngineStatsSnapshot {
    pub fn empty() -> Self {
        Self {
            orders_submitted: 0,
            orders_canceled: 0,
            trades_executed: 0,
            rejected_orders: 0,
            expired_orders: 0,
            active_orders: 0,
            avg_latency_us: 0.0,
            p95_latency_us: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = EngineStatsSnapshot::empty();
        assert_eq!(stats.orders_submitted, 0);
        assert_eq!(stats.avg_latency_us, 0.0);
    }
}
