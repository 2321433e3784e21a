//! Structured results for submit and cancel operations
//!
//! Validation failures and matching-policy outcomes surface here as data,
//! never as Rust errors: a rejected order is a successful call that returned
//! a terminal order.

use crate::events::OrderEvent;
use crate::order::Order;
use crate::reason::Reason;
use crate::trade::Trade;
use serde::{Deserialize, Serialize};

/// Result of one submission.
///
/// The first entry of `events` reflects the submitted order's own status for
/// this call (terminal, or its NEW/PARTIALLY_FILLED resting state); maker
/// transitions caused by the match follow in match order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub order: Order,
    pub trades: Vec<Trade>,
    pub events: Vec<OrderEvent>,
}

/// Result of one cancel attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelResult {
    pub canceled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<OrderEvent>,
}

impl CancelResult {
    pub fn failed(reason: Reason) -> Self {
        Self {
            canceled: false,
            order: None,
            reason: Some(reason),
            event: None,
        }
    }

    pub fn succeeded(order: Order, event: OrderEvent) -> Self {
        Self {
            canceled: true,
            order: Some(order),
            reason: Some(Reason::CanceledByUser),
            event: Some(event),
        }
    }
}
