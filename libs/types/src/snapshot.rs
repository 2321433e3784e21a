//! Depth snapshots
//!
//! Projections of one side of a book into price rows. Only displayed
//! quantity appears; iceberg reserves are never visible in depth.

use crate::ids::Symbol;
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// One aggregated price row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Price,
    /// Sum of displayed remaining quantity over the level's queue.
    pub quantity: Quantity,
    pub order_count: usize,
}

/// Two-sided depth projection, best levels first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDepth {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

/// Depth plus book identity and sequencing, for fan-out and state sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: Symbol,
    /// Book sequence at the time of the snapshot.
    pub sequence: u64,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}
