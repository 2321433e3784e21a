//! Order lifecycle events
//!
//! One event is emitted for every status change, including terminal
//! transitions that happen mid-match (maker fills, STP cancels). Events are
//! immutable and carry the book sequence that ordered them.

use crate::ids::{EventId, OrderId};
use crate::numeric::Quantity;
use crate::order::OrderStatus;
use crate::reason::Reason;
use serde::{Deserialize, Serialize};

/// Immutable record of one order status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_id: EventId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    pub remaining_quantity: Quantity,
    pub timestamp_ms: i64,
    pub sequence: u64,
}

impl OrderEvent {
    pub fn new(
        order_id: OrderId,
        status: OrderStatus,
        reason: Option<Reason>,
        remaining_quantity: Quantity,
        timestamp_ms: i64,
        sequence: u64,
    ) -> Self {
        Self {
            event_id: EventId::generate(),
            order_id,
            status,
            reason,
            remaining_quantity,
            timestamp_ms,
            sequence,
        }
    }
}
