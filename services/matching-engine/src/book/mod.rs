//! Order book infrastructure
//!
//! Queue-node arena, skip-list side indices, FIFO price levels, and the
//! per-symbol order book built on top of them.

pub mod arena;
pub mod order_book;
pub mod price_level;
pub mod skiplist;

pub use arena::{NodeArena, NodeIndex, QueueNode, NULL_INDEX};
pub use order_book::{BookConfig, OrderBook};
pub use price_level::PriceLevel;
pub use skiplist::{SkipList, MAX_LEVEL};
