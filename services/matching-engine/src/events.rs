//! Engine event fan-out
//!
//! Typed events broadcast to external consumers (WebSocket façade, state
//! sync, metrics). The bus never blocks the engine: publishing with no
//! subscribers, or past a lagging subscriber's buffer, just drops.

use tokio::sync::broadcast;
use types::{BookSnapshot, CancelResult, SubmitResult, Symbol, Trade};

/// Events emitted by the engine, ordered per symbol by book sequence.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A trade was executed.
    Trade(Trade),
    /// Post-submission (or post-cancel) depth snapshot.
    Orderbook {
        symbol: Symbol,
        snapshot: BookSnapshot,
    },
    /// Full result of a submission.
    OrderResult(SubmitResult),
    /// Full result of a cancel attempt.
    CancelResult(CancelResult),
}

/// Broadcast fan-out with a bounded per-subscriber buffer.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Publish, ignoring the no-subscriber case.
    pub fn publish(&self, event: EngineEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
