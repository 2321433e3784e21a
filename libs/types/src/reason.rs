//! Stable reason strings
//!
//! Every validation failure, matching-policy outcome, and cancel cause is
//! reported through one of these variants. The serialized form is part of the
//! external contract and must never change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason attached to order events and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    SymbolMismatch,
    MissingUserId,
    InvalidQuantity,
    QuantityNotLotMultiple,
    QuantityBelowMinimum,
    InvalidLimitPrice,
    PriceNotTickMultiple,
    MarketOrderCannotHavePrice,
    InvalidMinQuantity,
    MinQuantityNotLotMultiple,
    IcebergRequiresLimitOrder,
    InvalidIcebergDisplayQuantity,
    InsufficientLiquidityForFok,
    SelfTradePreventionCancelNewest,
    SelfTradePreventionCancelOldest,
    SelfTradePreventionCancelBoth,
    MarketOrderUnfilledRemainder,
    TimeInForceUnfilledRemainder,
    OrderNotFound,
    UserMismatch,
    OrderSymbolNotFound,
    CanceledByUser,
}

impl Reason {
    /// The stable string form used in events and results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::SymbolMismatch => "symbol_mismatch",
            Reason::MissingUserId => "missing_user_id",
            Reason::InvalidQuantity => "invalid_quantity",
            Reason::QuantityNotLotMultiple => "quantity_not_lot_multiple",
            Reason::QuantityBelowMinimum => "quantity_below_minimum",
            Reason::InvalidLimitPrice => "invalid_limit_price",
            Reason::PriceNotTickMultiple => "price_not_tick_multiple",
            Reason::MarketOrderCannotHavePrice => "market_order_cannot_have_price",
            Reason::InvalidMinQuantity => "invalid_min_quantity",
            Reason::MinQuantityNotLotMultiple => "min_quantity_not_lot_multiple",
            Reason::IcebergRequiresLimitOrder => "iceberg_requires_limit_order",
            Reason::InvalidIcebergDisplayQuantity => "invalid_iceberg_display_quantity",
            Reason::InsufficientLiquidityForFok => "insufficient_liquidity_for_fok",
            Reason::SelfTradePreventionCancelNewest => "self_trade_prevention_cancel_newest",
            Reason::SelfTradePreventionCancelOldest => "self_trade_prevention_cancel_oldest",
            Reason::SelfTradePreventionCancelBoth => "self_trade_prevention_cancel_both",
            Reason::MarketOrderUnfilledRemainder => "market_order_unfilled_remainder",
            Reason::TimeInForceUnfilledRemainder => "time_in_force_unfilled_remainder",
            Reason::OrderNotFound => "order_not_found",
            Reason::UserMismatch => "user_mismatch",
            Reason::OrderSymbolNotFound => "order_symbol_not_found",
            Reason::CanceledByUser => "canceled_by_user",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_form_matches_as_str() {
        let all = [
            Reason::SymbolMismatch,
            Reason::MissingUserId,
            Reason::InvalidQuantity,
            Reason::QuantityNotLotMultiple,
            Reason::QuantityBelowMinimum,
            Reason::InvalidLimitPrice,
            Reason::PriceNotTickMultiple,
            Reason::MarketOrderCannotHavePrice,
            Reason::InvalidMinQuantity,
            Reason::MinQuantityNotLotMultiple,
            Reason::IcebergRequiresLimitOrder,
            Reason::InvalidIcebergDisplayQuantity,
            Reason::InsufficientLiquidityForFok,
            Reason::SelfTradePreventionCancelNewest,
            Reason::SelfTradePreventionCancelOldest,
            Reason::SelfTradePreventionCancelBoth,
            Reason::MarketOrderUnfilledRemainder,
            Reason::TimeInForceUnfilledRemainder,
            Reason::OrderNotFound,
            Reason::UserMismatch,
            Reason::OrderSymbolNotFound,
            Reason::CanceledByUser,
        ];
        for reason in all {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
    }

    #[test]
    fn test_stable_strings() {
        assert_eq!(
            Reason::InsufficientLiquidityForFok.as_str(),
            "insufficient_liquidity_for_fok"
        );
        assert_eq!(Reason::CanceledByUser.as_str(), "canceled_by_user");
        assert_eq!(
            Reason::SelfTradePreventionCancelBoth.to_string(),
            "self_trade_prevention_cancel_both"
        );
    }
}
