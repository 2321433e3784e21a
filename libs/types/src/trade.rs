//! Trade records
//!
//! A trade is an immutable record of one match between a resting maker and an
//! aggressing taker. Executions always print at the maker's price.

use crate::ids::{OrderId, Symbol, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// Immutable trade record.
///
/// The `buy_*`/`sell_*` fields are derived from the taker side so consumers
/// never have to re-resolve which leg bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
    pub taker_side: Side,
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buy_user_id: String,
    pub sell_user_id: String,
    pub timestamp_ms: i64,
    pub sequence: u64,
}

impl Trade {
    /// Build a trade from the maker/taker pair, deriving the buy/sell legs.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        price: Price,
        quantity: Quantity,
        taker_side: Side,
        taker_order_id: OrderId,
        taker_user_id: &str,
        maker_order_id: OrderId,
        maker_user_id: &str,
        timestamp_ms: i64,
        sequence: u64,
    ) -> Self {
        let (buy_order_id, sell_order_id, buy_user_id, sell_user_id) = match taker_side {
            Side::Buy => (
                taker_order_id.clone(),
                maker_order_id.clone(),
                taker_user_id.to_string(),
                maker_user_id.to_string(),
            ),
            Side::Sell => (
                maker_order_id.clone(),
                taker_order_id.clone(),
                maker_user_id.to_string(),
                taker_user_id.to_string(),
            ),
        };
        Self {
            trade_id: TradeId::generate(),
            symbol,
            price,
            quantity,
            taker_side,
            taker_order_id,
            maker_order_id,
            buy_order_id,
            sell_order_id,
            buy_user_id,
            sell_user_id,
            timestamp_ms,
            sequence,
        }
    }
}
