//! Engine statistics
//!
//! Cumulative counters plus a bounded ring of recent per-call latencies,
//! from which the rolling average and p95 are derived. Latencies are
//! observational only and never participate in replay comparison.

use std::collections::VecDeque;
use types::EngineStatsSnapshot;

/// Number of latency samples retained.
pub const LATENCY_WINDOW: usize = 2_000;

#[derive(Debug)]
pub struct EngineStats {
    pub orders_submitted: u64,
    pub orders_canceled: u64,
    pub trades_executed: u64,
    pub rejected_orders: u64,
    pub expired_orders: u64,
    latencies_us: VecDeque<f64>,
}

impl EngineStats {
    pub fn new() -> Self {
        Self {
            orders_submitted: 0,
            orders_canceled: 0,
            trades_executed: 0,
            rejected_orders: 0,
            expired_orders: 0,
            latencies_us: VecDeque::with_capacity(LATENCY_WINDOW),
        }
    }

    /// Record one call latency in microseconds.
    pub fn record_latency(&mut self, micros: f64) {
        if self.latencies_us.len() == LATENCY_WINDOW {
            self.latencies_us.pop_front();
        }
        self.latencies_us.push_back(micros);
    }

    pub fn avg_latency_us(&self) -> f64 {
        if self.latencies_us.is_empty() {
            return 0.0;
        }
        self.latencies_us.iter().sum::<f64>() / self.latencies_us.len() as f64
    }

    pub fn p95_latency_us(&self) -> f64 {
        if self.latencies_us.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.latencies_us.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let rank = ((sorted.len() as f64) * 0.95).ceil() as usize;
        sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
    }

    pub fn snapshot(&self, active_orders: usize) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            orders_submitted: self.orders_submitted,
            orders_canceled: self.orders_canceled,
            trades_executed: self.trades_executed,
            rejected_orders: self.rejected_orders,
            expired_orders: self.expired_orders,
            active_orders,
            avg_latency_us: self.avg_latency_us(),
            p95_latency_us: self.p95_latency_us(),
        }
    }
}

impl Default for EngineStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_latency_stats() {
        let stats = EngineStats::new();
        assert_eq!(stats.avg_latency_us(), 0.0);
        assert_eq!(stats.p95_latency_us(), 0.0);
    }

    #[test]
    fn test_avg_and_p95() {
        let mut stats = EngineStats::new();
        for i in 1..=100 {
            stats.record_latency(i as f64);
        }
        assert!((stats.avg_latency_us() - 50.5).abs() < 1e-9);
        assert_eq!(stats.p95_latency_us(), 95.0);
    }

    #[test]
    fn test_window_bounds_samples() {
        let mut stats = EngineStats::new();
        for _ in 0..LATENCY_WINDOW {
            stats.record_latency(1.0);
        }
        // A flood of slow calls pushes the old fast ones out
        for _ in 0..LATENCY_WINDOW {
            stats.record_latency(100.0);
        }
        assert_eq!(stats.avg_latency_us(), 100.0);
    }

    #[test]
    fn test_snapshot_copies_counters() {
        let mut stats = EngineStats::new();
        stats.orders_submitted = 10;
        stats.trades_executed = 4;
        stats.rejected_orders = 1;
        let snap = stats.snapshot(3);
        assert_eq!(snap.orders_submitted, 10);
        assert_eq!(snap.trades_executed, 4);
        assert_eq!(snap.rejected_orders, 1);
        assert_eq!(snap.active_orders, 3);
    }
}
