//! Block-tick driver
//!
//! Owns the engine and the mempool behind one mutex so every mutation —
//! direct submissions, cancels, and block ticks — serializes onto a single
//! logical thread. The timer task uses `try_lock` as the reentrancy guard:
//! if a tick is still running when the interval fires, that fire is
//! skipped.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use matching_engine::MatchingEngine;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use types::Command;

use crate::pool::{SubmitHandle, VirtualMempool};

/// Engine plus mempool, guarded together.
pub struct SimState {
    pub engine: MatchingEngine,
    pub mempool: VirtualMempool,
}

/// Shared handle around the simulator state with a block timer.
#[derive(Clone)]
pub struct MempoolService {
    state: Arc<Mutex<SimState>>,
}

impl MempoolService {
    pub fn new(engine: MatchingEngine, mempool: VirtualMempool) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState { engine, mempool })),
        }
    }

    /// Direct access for reads and synchronous test drives.
    pub fn state(&self) -> Arc<Mutex<SimState>> {
        Arc::clone(&self.state)
    }

    /// Submit a payload through the mempool.
    pub fn submit(
        &self,
        payload: Command,
        gas_price: u128,
        max_priority_fee_per_gas: u128,
        confirmations: Option<u32>,
    ) -> SubmitHandle {
        let mut guard = self.state.lock();
        guard
            .mempool
            .submit(payload, gas_price, max_priority_fee_per_gas, confirmations, now_ms())
    }

    /// Start the block timer. The task runs until aborted.
    pub fn spawn_block_timer(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let interval_ms = state.lock().mempool.config().block_interval_ms;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            loop {
                ticker.tick().await;
                match state.try_lock() {
                    Some(mut guard) => {
                        let now = now_ms();
                        let SimState { engine, mempool } = &mut *guard;
                        mempool.tick(engine, now);
                    }
                    None => {
                        tracing::debug!("block tick skipped; previous tick still running");
                    }
                }
            }
        })
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
