//! Order lifecycle types

use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order kind: priced or marketable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Limit,
    Market,
}

/// Time-in-force policy for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good-Till-Cancel: rests until filled or explicitly canceled
    Gtc,
    /// Immediate-Or-Cancel: match immediately, expire the remainder
    Ioc,
    /// Fill-Or-Kill: full fill or reject before any trade occurs
    Fok,
}

impl TimeInForce {
    /// Default when the request omits the field: market orders are IOC,
    /// limit orders rest.
    pub fn default_for(kind: OrderKind) -> Self {
        match kind {
            OrderKind::Market => TimeInForce::Ioc,
            OrderKind::Limit => TimeInForce::Gtc,
        }
    }
}

/// Self-trade prevention policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTradePrevention {
    #[default]
    None,
    CancelNewest,
    CancelOldest,
    CancelBoth,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Rejected | OrderStatus::Expired
        )
    }
}

/// Submission request, before the book has validated or sequenced it.
///
/// Unspecified ids are generated as prefixed opaque strings at the engine
/// boundary, before the command is logged, so replay sees identical ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    pub symbol: Symbol,
    pub user_id: String,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iceberg_display_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_trade_prevention: Option<SelfTradePrevention>,
}

/// Complete order entity, owned by its book while resting.
///
/// Quantity invariant: `remaining = displayed_remaining + reserve_remaining`
/// at all times. For resting orders,
/// `displayed_remaining ≤ display_quantity ≤ remaining`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    /// Monotonic within the owning book.
    pub sequence: u64,
    pub symbol: Symbol,
    pub user_id: String,
    pub side: Side,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
    pub original_quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Iceberg peak; equals `original_quantity` when non-iceberg.
    pub display_quantity: Quantity,
    /// Slice matchable right now.
    pub displayed_remaining_quantity: Quantity,
    /// Hidden reserve awaiting replenishment.
    pub reserve_remaining_quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    pub self_trade_prevention: SelfTradePrevention,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl Order {
    /// Whether this order hides part of its size.
    pub fn is_iceberg(&self) -> bool {
        self.display_quantity < self.original_quantity
    }

    /// Quantity invariant: remaining = displayed + reserve.
    pub fn check_quantity_invariant(&self) -> bool {
        self.displayed_remaining_quantity + self.reserve_remaining_quantity
            == self.remaining_quantity
    }

    /// Apply a fill of `quantity` against the displayed slice.
    ///
    /// # Panics
    /// Panics if the fill exceeds the displayed remaining quantity.
    pub fn apply_fill(&mut self, quantity: Quantity, now_ms: i64) {
        self.remaining_quantity = self.remaining_quantity - quantity;
        self.displayed_remaining_quantity = self.displayed_remaining_quantity - quantity;
        self.updated_at_ms = now_ms;
        debug_assert!(self.check_quantity_invariant());
    }

    /// Move a fresh slice from reserve into the displayed quantity.
    ///
    /// Returns the replenished amount (zero when no reserve remains).
    pub fn replenish_display(&mut self, now_ms: i64) -> Quantity {
        let slice = self.display_quantity.min(self.reserve_remaining_quantity);
        if slice.is_positive() {
            self.reserve_remaining_quantity = self.reserve_remaining_quantity - slice;
            self.displayed_remaining_quantity = self.displayed_remaining_quantity + slice;
            self.updated_at_ms = now_ms;
        }
        debug_assert!(self.check_quantity_invariant());
        slice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order {
            id: OrderId::from_string("ord-1"),
            client_order_id: None,
            sequence: 1,
            symbol: Symbol::new("ETH-USD"),
            user_id: "alice".to_string(),
            side: Side::Sell,
            kind: OrderKind::Limit,
            time_in_force: TimeInForce::Gtc,
            status: OrderStatus::New,
            original_quantity: Quantity::from_u64(10),
            remaining_quantity: Quantity::from_u64(10),
            display_quantity: Quantity::from_u64(3),
            displayed_remaining_quantity: Quantity::from_u64(3),
            reserve_remaining_quantity: Quantity::from_u64(7),
            min_quantity: None,
            price: Some(Price::from_u64(100)),
            self_trade_prevention: SelfTradePrevention::None,
            created_at_ms: 1_700_000_000_000,
            updated_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_tif_defaults() {
        assert_eq!(TimeInForce::default_for(OrderKind::Market), TimeInForce::Ioc);
        assert_eq!(TimeInForce::default_for(OrderKind::Limit), TimeInForce::Gtc);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OrderStatus::New.is_terminal());
        assert!(!OrderStatus::PartiallyFilled.is_terminal());
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(OrderStatus::Expired.is_terminal());
    }

    #[test]
    fn test_iceberg_detection() {
        let order = sample_order();
        assert!(order.is_iceberg());
        assert!(order.check_quantity_invariant());
    }

    #[test]
    fn test_apply_fill_keeps_invariant() {
        let mut order = sample_order();
        order.apply_fill(Quantity::from_u64(2), 1_700_000_000_500);
        assert_eq!(order.remaining_quantity, Quantity::from_u64(8));
        assert_eq!(order.displayed_remaining_quantity, Quantity::from_u64(1));
        assert_eq!(order.reserve_remaining_quantity, Quantity::from_u64(7));
        assert!(order.check_quantity_invariant());
    }

    #[test]
    fn test_replenish_after_display_depleted() {
        let mut order = sample_order();
        order.apply_fill(Quantity::from_u64(3), 1_700_000_000_500);
        assert!(order.displayed_remaining_quantity.is_zero());

        let slice = order.replenish_display(1_700_000_000_600);
        assert_eq!(slice, Quantity::from_u64(3));
        assert_eq!(order.displayed_remaining_quantity, Quantity::from_u64(3));
        assert_eq!(order.reserve_remaining_quantity, Quantity::from_u64(4));
        assert!(order.check_quantity_invariant());
    }

    #[test]
    fn test_replenish_caps_at_reserve() {
        let mut order = sample_order();
        // Burn down to 2 total remaining: fill 3, replenish, fill 3, fill 2
        order.apply_fill(Quantity::from_u64(3), 1);
        order.replenish_display(2);
        order.apply_fill(Quantity::from_u64(3), 3);
        order.replenish_display(4);
        order.apply_fill(Quantity::from_u64(3), 5);
        let slice = order.replenish_display(6);
        assert_eq!(slice, Quantity::from_u64(1));
        assert_eq!(order.remaining_quantity, Quantity::from_u64(1));
        assert!(order.check_quantity_invariant());
    }

    #[test]
    fn test_request_serde_omits_absent_fields() {
        let req = SubmitOrderRequest {
            id: None,
            client_order_id: None,
            symbol: Symbol::new("ETH-USD"),
            user_id: "alice".into(),
            side: Side::Buy,
            kind: OrderKind::Market,
            quantity: Quantity::from_u64(5),
            price: None,
            time_in_force: None,
            min_quantity: None,
            iceberg_display_quantity: None,
            self_trade_prevention: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("price"));
        assert!(json.contains("\"side\":\"buy\""));
        assert!(json.contains("\"kind\":\"market\""));
    }
}
