//! Price level — FIFO queue of orders at one price
//!
//! The level owns head/tail indices into the book's queue-node arena and
//! tracks the displayed quantity available at this price. Time priority is
//! the queue order; an iceberg refresh re-enters at the tail.

use super::arena::{NodeArena, NodeIndex, NULL_INDEX};
use types::{Price, Quantity};

/// One side's resting orders at a single price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    head: NodeIndex,
    tail: NodeIndex,
    order_count: usize,
    /// Sum of displayed remaining quantity over the queue. Hidden iceberg
    /// reserve never counts here.
    total_visible_quantity: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            head: NULL_INDEX,
            tail: NULL_INDEX,
            order_count: 0,
            total_visible_quantity: Quantity::zero(),
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    pub fn total_visible_quantity(&self) -> Quantity {
        self.total_visible_quantity
    }

    pub fn is_empty(&self) -> bool {
        self.head == NULL_INDEX
    }

    /// Oldest order at this price.
    pub fn front(&self) -> Option<NodeIndex> {
        if self.head == NULL_INDEX {
            None
        } else {
            Some(self.head)
        }
    }

    /// Link a node at the tail (newest time priority).
    pub fn append(&mut self, arena: &mut NodeArena, index: NodeIndex) {
        let visible = arena.get(index).order.displayed_remaining_quantity;
        {
            let node = arena.get_mut(index);
            node.prev = self.tail;
            node.next = NULL_INDEX;
        }
        if self.tail != NULL_INDEX {
            arena.get_mut(self.tail).next = index;
        } else {
            self.head = index;
        }
        self.tail = index;
        self.order_count += 1;
        self.total_visible_quantity = self.total_visible_quantity + visible;
    }

    /// Unlink a node in O(1), repairing head/tail, and free it from the
    /// arena. Returns the departed order. The visible total drops by the
    /// order's displayed slice only.
    pub fn remove(&mut self, arena: &mut NodeArena, index: NodeIndex) -> types::Order {
        self.unlink(arena, index);
        let order = arena.remove(index);
        self.order_count -= 1;
        self.total_visible_quantity = self
            .total_visible_quantity
            .saturating_sub(order.displayed_remaining_quantity);
        order
    }

    /// Move a node to the tail: an iceberg's refreshed slice loses its time
    /// priority. Count and visible total are unchanged (the caller accounts
    /// for the replenished quantity via `increase_visible_quantity`).
    pub fn move_to_tail(&mut self, arena: &mut NodeArena, index: NodeIndex) {
        if self.tail == index {
            return;
        }
        self.unlink(arena, index);
        {
            let node = arena.get_mut(index);
            node.prev = self.tail;
            node.next = NULL_INDEX;
        }
        if self.tail != NULL_INDEX {
            arena.get_mut(self.tail).next = index;
        } else {
            self.head = index;
        }
        self.tail = index;
    }

    pub fn reduce_visible_quantity(&mut self, delta: Quantity) {
        self.total_visible_quantity = self.total_visible_quantity.saturating_sub(delta);
    }

    pub fn increase_visible_quantity(&mut self, delta: Quantity) {
        self.total_visible_quantity = self.total_visible_quantity + delta;
    }

    fn unlink(&mut self, arena: &mut NodeArena, index: NodeIndex) {
        let (prev, next) = {
            let node = arena.get(index);
            (node.prev, node.next)
        };
        if prev != NULL_INDEX {
            arena.get_mut(prev).next = next;
        } else {
            self.head = next;
        }
        if next != NULL_INDEX {
            arena.get_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }
        let node = arena.get_mut(index);
        node.prev = NULL_INDEX;
        node.next = NULL_INDEX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Order, OrderId, OrderKind, OrderStatus, SelfTradePrevention, Side, Symbol, TimeInForce};

    fn order(id: &str, displayed: u64, reserve: u64) -> Order {
        Order {
            id: OrderId::from_string(id),
            client_order_id: None,
            sequence: 0,
            symbol: Symbol::new("ETH-USD"),
            user_id: "alice".into(),
            side: Side::Sell,
            kind: OrderKind::Limit,
            time_in_force: TimeInForce::Gtc,
            status: OrderStatus::New,
            original_quantity: Quantity::from_u64(displayed + reserve),
            remaining_quantity: Quantity::from_u64(displayed + reserve),
            display_quantity: Quantity::from_u64(displayed),
            displayed_remaining_quantity: Quantity::from_u64(displayed),
            reserve_remaining_quantity: Quantity::from_u64(reserve),
            min_quantity: None,
            price: Some(Price::from_u64(100)),
            self_trade_prevention: SelfTradePrevention::None,
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }

    fn queue_ids(level: &PriceLevel, arena: &NodeArena) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = level.front().unwrap_or(NULL_INDEX);
        while cursor != NULL_INDEX {
            let node = arena.get(cursor);
            out.push(node.order.id.as_str().to_string());
            cursor = node.next;
        }
        out
    }

    #[test]
    fn test_append_fifo_order() {
        let mut arena = NodeArena::new();
        let mut level = PriceLevel::new(Price::from_u64(100));
        for id in ["a", "b", "c"] {
            let idx = arena.insert(order(id, 5, 0));
            level.append(&mut arena, idx);
        }
        assert_eq!(queue_ids(&level, &arena), vec!["a", "b", "c"]);
        assert_eq!(level.order_count(), 3);
        assert_eq!(level.total_visible_quantity(), Quantity::from_u64(15));
    }

    #[test]
    fn test_visible_excludes_reserve() {
        let mut arena = NodeArena::new();
        let mut level = PriceLevel::new(Price::from_u64(100));
        let idx = arena.insert(order("iceberg", 3, 7));
        level.append(&mut arena, idx);
        assert_eq!(level.total_visible_quantity(), Quantity::from_u64(3));
    }

    #[test]
    fn test_remove_middle() {
        let mut arena = NodeArena::new();
        let mut level = PriceLevel::new(Price::from_u64(100));
        let mut indices = Vec::new();
        for id in ["a", "b", "c"] {
            let idx = arena.insert(order(id, 5, 0));
            level.append(&mut arena, idx);
            indices.push(idx);
        }
        let removed = level.remove(&mut arena, indices[1]);
        assert_eq!(removed.id.as_str(), "b");
        assert_eq!(queue_ids(&level, &arena), vec!["a", "c"]);
        assert_eq!(level.total_visible_quantity(), Quantity::from_u64(10));
    }

    #[test]
    fn test_remove_sole_node_repairs_both_ends() {
        let mut arena = NodeArena::new();
        let mut level = PriceLevel::new(Price::from_u64(100));
        let idx = arena.insert(order("only", 5, 0));
        level.append(&mut arena, idx);
        level.remove(&mut arena, idx);
        assert!(level.is_empty());
        assert!(level.front().is_none());
        assert!(level.total_visible_quantity().is_zero());
        // Appending again must work from the repaired state
        let idx2 = arena.insert(order("next", 2, 0));
        level.append(&mut arena, idx2);
        assert_eq!(queue_ids(&level, &arena), vec!["next"]);
    }

    #[test]
    fn test_remove_head_and_tail() {
        let mut arena = NodeArena::new();
        let mut level = PriceLevel::new(Price::from_u64(100));
        let mut indices = Vec::new();
        for id in ["a", "b", "c"] {
            let idx = arena.insert(order(id, 1, 0));
            level.append(&mut arena, idx);
            indices.push(idx);
        }
        level.remove(&mut arena, indices[0]);
        assert_eq!(queue_ids(&level, &arena), vec!["b", "c"]);
        level.remove(&mut arena, indices[2]);
        assert_eq!(queue_ids(&level, &arena), vec!["b"]);
    }

    #[test]
    fn test_move_to_tail_loses_priority() {
        let mut arena = NodeArena::new();
        let mut level = PriceLevel::new(Price::from_u64(100));
        let mut indices = Vec::new();
        for id in ["a", "b", "c"] {
            let idx = arena.insert(order(id, 1, 0));
            level.append(&mut arena, idx);
            indices.push(idx);
        }
        level.move_to_tail(&mut arena, indices[0]);
        assert_eq!(queue_ids(&level, &arena), vec!["b", "c", "a"]);
        assert_eq!(level.order_count(), 3);
    }

    #[test]
    fn test_move_to_tail_when_already_tail() {
        let mut arena = NodeArena::new();
        let mut level = PriceLevel::new(Price::from_u64(100));
        let a = arena.insert(order("a", 1, 0));
        let b = arena.insert(order("b", 1, 0));
        level.append(&mut arena, a);
        level.append(&mut arena, b);
        level.move_to_tail(&mut arena, b);
        assert_eq!(queue_ids(&level, &arena), vec!["a", "b"]);
    }

    #[test]
    fn test_visible_quantity_adjustments() {
        let mut arena = NodeArena::new();
        let mut level = PriceLevel::new(Price::from_u64(100));
        let idx = arena.insert(order("a", 5, 5));
        level.append(&mut arena, idx);
        level.reduce_visible_quantity(Quantity::from_u64(5));
        assert!(level.total_visible_quantity().is_zero());
        level.increase_visible_quantity(Quantity::from_u64(5));
        assert_eq!(level.total_visible_quantity(), Quantity::from_u64(5));
    }
}
