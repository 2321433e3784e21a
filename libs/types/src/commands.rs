//! Engine commands
//!
//! Commands are the replayable inputs of the system: every mutation enters as
//! a submit or cancel, is appended to the command log before it is applied,
//! and can be re-applied verbatim during recovery. Each command carries a
//! generated `command_id` so event records can reference the command that
//! produced them.

use crate::ids::{CommandId, OrderId, Symbol};
use crate::order::SubmitOrderRequest;
use serde::{Deserialize, Serialize};

/// Submit a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrderCommand {
    #[serde(rename = "commandId")]
    pub command_id: CommandId,
    pub request: SubmitOrderRequest,
}

/// Cancel a resting order by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOrderCommand {
    #[serde(rename = "commandId")]
    pub command_id: CommandId,
    pub order_id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Symbol>,
}

/// A replayable engine input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SubmitOrder(SubmitOrderCommand),
    CancelOrder(CancelOrderCommand),
}

impl Command {
    pub fn submit(request: SubmitOrderRequest) -> Self {
        Command::SubmitOrder(SubmitOrderCommand {
            command_id: CommandId::generate(),
            request,
        })
    }

    pub fn cancel(order_id: OrderId, user_id: Option<String>, symbol: Option<Symbol>) -> Self {
        Command::CancelOrder(CancelOrderCommand {
            command_id: CommandId::generate(),
            order_id,
            user_id,
            symbol,
        })
    }

    pub fn command_id(&self) -> &CommandId {
        match self {
            Command::SubmitOrder(c) => &c.command_id,
            Command::CancelOrder(c) => &c.command_id,
        }
    }
}
