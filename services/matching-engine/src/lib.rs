//! Matching Engine Service
//!
//! Deterministic multi-symbol CLOB with strict price-time priority:
//! skip-list side indices over arena-backed FIFO levels, iceberg and
//! self-trade-prevention policies, GTC/IOC/FOK time in force, a command log
//! for exact replay, and typed event fan-out.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced; trades print at maker prices
//! - Deterministic matching and structure (seeded skip-list promotion)
//! - Per-book monotonic sequence labels orders, trades, and events
//! - Hidden iceberg reserve never appears in depth or FOK checks

pub mod book;
pub mod engine;
pub mod events;
pub mod stats;

pub use book::{BookConfig, OrderBook};
pub use engine::{EngineConfig, MarketConfig, MatchingEngine, ReplayReport};
pub use events::{EngineEvent, EventBus};
pub use stats::{EngineStats, LATENCY_WINDOW};
