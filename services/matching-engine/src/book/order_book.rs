//! Order book for a single symbol
//!
//! Two skip-list side indices over arena-backed FIFO levels, an id map for
//! O(1) cancels, and bounded rings of trades and order events. Matching is
//! strict price-time priority: best opposite level first, oldest order
//! within the level first, executions at the maker's price.

use std::collections::{HashMap, VecDeque};

use rust_decimal::Decimal;
use types::{
    BookDepth, BookSnapshot, CancelResult, DepthLevel, Order, OrderEvent, OrderId, OrderKind,
    OrderStatus, Price, Quantity, Reason, SelfTradePrevention, Side, SubmitOrderRequest,
    SubmitResult, Symbol, TimeInForce, Trade,
};

use super::arena::{NodeArena, NodeIndex};
use super::price_level::PriceLevel;
use super::skiplist::SkipList;
use determinism::SimRng;

/// Per-book configuration.
#[derive(Debug, Clone)]
pub struct BookConfig {
    pub symbol: Symbol,
    pub tick_size: Decimal,
    pub lot_size: Decimal,
    /// Floor on request quantity; defaults to one lot.
    pub min_order_quantity: Quantity,
    pub trade_ring_capacity: usize,
    pub event_ring_capacity: usize,
}

impl BookConfig {
    pub fn new(symbol: Symbol, tick_size: Decimal, lot_size: Decimal) -> Self {
        Self {
            symbol,
            tick_size,
            min_order_quantity: Quantity::new(lot_size),
            lot_size,
            trade_ring_capacity: 1024,
            event_ring_capacity: 2048,
        }
    }
}

/// Where a resting order lives: its side, its level's price, and its queue
/// node. Stable indices replace shared references into the queue.
#[derive(Debug, Clone, Copy)]
struct OrderRef {
    side: Side,
    price: Price,
    node: NodeIndex,
}

/// Two-sided order book with price-time priority matching.
#[derive(Debug)]
pub struct OrderBook {
    config: BookConfig,
    bids: SkipList<PriceLevel>,
    asks: SkipList<PriceLevel>,
    arena: NodeArena,
    orders: HashMap<OrderId, OrderRef>,
    trades: VecDeque<Trade>,
    events: VecDeque<OrderEvent>,
    /// Advances on order acceptance, every trade, and every order event.
    sequence: u64,
}

impl OrderBook {
    /// Create a book. Each side index derives its own promotion stream from
    /// the given root so the structure replays identically.
    pub fn new(config: BookConfig, rng: &SimRng) -> Self {
        let bids_rng = rng.derive(&format!("book:{}:bids", config.symbol));
        let asks_rng = rng.derive(&format!("book:{}:asks", config.symbol));
        Self {
            config,
            bids: SkipList::new(bids_rng),
            asks: SkipList::new(asks_rng),
            arena: NodeArena::new(),
            orders: HashMap::new(),
            trades: VecDeque::new(),
            events: VecDeque::new(),
            sequence: 0,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.config.symbol
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Validate, match, and either rest or expire the remainder.
    ///
    /// Validation failures and matching-policy outcomes are data, not
    /// errors: the returned order carries a terminal status and a stable
    /// reason on its first event.
    pub fn submit_order(&mut self, request: SubmitOrderRequest, now_ms: i64) -> SubmitResult {
        let mut order = self.build_order(&request, now_ms);

        if let Err(reason) = self.validate(&request) {
            return self.reject(order, reason, now_ms);
        }
        if order.time_in_force == TimeInForce::Fok && !self.fok_fillable(&order) {
            return self.reject(order, Reason::InsufficientLiquidityForFok, now_ms);
        }

        // Accepted: the order takes its book sequence before any trade.
        order.sequence = self.next_sequence();

        let mut trades: Vec<Trade> = Vec::new();
        let mut maker_events: Vec<OrderEvent> = Vec::new();
        let mut taker_stp_reason: Option<Reason> = None;

        while order.remaining_quantity.is_positive() {
            let maker_side = order.side.opposite();
            let best = match maker_side {
                Side::Buy => self.bids.first(),
                Side::Sell => self.asks.first(),
            }
            .map(|(_, level)| (level.price(), level.front()));
            let Some((maker_price, Some(maker_index))) = best else {
                break;
            };
            if !Self::crosses(&order, maker_price) {
                break;
            }

            let (maker_id, maker_user_id, maker_displayed, maker_stp) = {
                let node = self.arena.get(maker_index);
                (
                    node.order.id.clone(),
                    node.order.user_id.clone(),
                    node.order.displayed_remaining_quantity,
                    node.order.self_trade_prevention,
                )
            };

            // Self-trade prevention: the taker's policy wins; a resting
            // order's policy applies when the taker carries none.
            let policy = if order.self_trade_prevention != SelfTradePrevention::None {
                order.self_trade_prevention
            } else {
                maker_stp
            };
            if maker_user_id == order.user_id && policy != SelfTradePrevention::None {
                match policy {
                    SelfTradePrevention::CancelOldest => {
                        let (_, event) = self.cancel_resting(
                            maker_index,
                            maker_side,
                            maker_price,
                            Reason::SelfTradePreventionCancelOldest,
                            now_ms,
                        );
                        maker_events.push(event);
                        continue;
                    }
                    SelfTradePrevention::CancelNewest => {
                        taker_stp_reason = Some(Reason::SelfTradePreventionCancelNewest);
                        break;
                    }
                    SelfTradePrevention::CancelBoth => {
                        let (_, event) = self.cancel_resting(
                            maker_index,
                            maker_side,
                            maker_price,
                            Reason::SelfTradePreventionCancelBoth,
                            now_ms,
                        );
                        maker_events.push(event);
                        taker_stp_reason = Some(Reason::SelfTradePreventionCancelBoth);
                        break;
                    }
                    SelfTradePrevention::None => unreachable!(),
                }
            }

            let executable = order.remaining_quantity.min(maker_displayed);
            if !executable.is_positive() {
                break;
            }

            // Trades print at the maker's price.
            let sequence = self.next_sequence();
            let trade = Trade::new(
                self.config.symbol.clone(),
                maker_price,
                executable,
                order.side,
                order.id.clone(),
                &order.user_id,
                maker_id,
                &maker_user_id,
                now_ms,
                sequence,
            );
            self.push_trade(trade.clone());
            trades.push(trade);

            order.apply_fill(executable, now_ms);

            let (maker_filled, maker_replenish) = {
                let (index, arena) = self.side_and_arena(maker_side);
                let Some(level) = index.get_mut(Self::sort_key(maker_side, maker_price)) else {
                    unreachable!("crossed level vanished mid-match");
                };
                let node = arena.get_mut(maker_index);
                node.order.apply_fill(executable, now_ms);
                level.reduce_visible_quantity(executable);
                let filled = node.order.remaining_quantity.is_zero();
                if !filled {
                    node.order.status = OrderStatus::PartiallyFilled;
                }
                let replenish = !filled && node.order.displayed_remaining_quantity.is_zero();
                (filled, replenish)
            };

            if maker_filled {
                let mut maker_order = self.unlink_resting(maker_index, maker_side, maker_price);
                maker_order.status = OrderStatus::Filled;
                maker_order.updated_at_ms = now_ms;
                let event = self.record_event(&maker_order, None, now_ms);
                maker_events.push(event);
            } else if maker_replenish {
                // Iceberg refresh: the new slice joins at the tail and
                // loses its time priority.
                let (index, arena) = self.side_and_arena(maker_side);
                if let Some(level) = index.get_mut(Self::sort_key(maker_side, maker_price)) {
                    let slice = arena.get_mut(maker_index).order.replenish_display(now_ms);
                    level.increase_visible_quantity(slice);
                    level.move_to_tail(arena, maker_index);
                }
            }
        }

        let taker_event = if let Some(reason) = taker_stp_reason {
            order.status = OrderStatus::Canceled;
            order.updated_at_ms = now_ms;
            self.record_event(&order, Some(reason), now_ms)
        } else if order.remaining_quantity.is_positive() {
            if order.kind == OrderKind::Limit && order.time_in_force == TimeInForce::Gtc {
                order.status = if trades.is_empty() {
                    OrderStatus::New
                } else {
                    OrderStatus::PartiallyFilled
                };
                let displayed = order.display_quantity.min(order.remaining_quantity);
                order.reserve_remaining_quantity = order.remaining_quantity - displayed;
                order.displayed_remaining_quantity = displayed;
                self.rest(order.clone());
                self.record_event(&order, None, now_ms)
            } else {
                order.status = OrderStatus::Expired;
                order.updated_at_ms = now_ms;
                let reason = if order.kind == OrderKind::Market {
                    Reason::MarketOrderUnfilledRemainder
                } else {
                    Reason::TimeInForceUnfilledRemainder
                };
                self.record_event(&order, Some(reason), now_ms)
            }
        } else {
            order.status = OrderStatus::Filled;
            order.updated_at_ms = now_ms;
            self.record_event(&order, None, now_ms)
        };

        let mut events = Vec::with_capacity(1 + maker_events.len());
        events.push(taker_event);
        events.extend(maker_events);

        SubmitResult {
            order,
            trades,
            events,
        }
    }

    // ── Cancel ──────────────────────────────────────────────────────

    /// Cancel a resting order by id, optionally enforcing ownership.
    pub fn cancel_order(
        &mut self,
        order_id: &OrderId,
        user_id: Option<&str>,
        now_ms: i64,
    ) -> CancelResult {
        let Some(oref) = self.orders.get(order_id).copied() else {
            return CancelResult::failed(Reason::OrderNotFound);
        };
        if let Some(user) = user_id {
            if self.arena.get(oref.node).order.user_id != user {
                return CancelResult::failed(Reason::UserMismatch);
            }
        }
        let (order, event) = self.cancel_resting(
            oref.node,
            oref.side,
            oref.price,
            Reason::CanceledByUser,
            now_ms,
        );
        CancelResult::succeeded(order, event)
    }

    // ── Read surface ────────────────────────────────────────────────

    /// Aggregated depth, best levels first. Hidden reserves never appear.
    pub fn depth(&self, depth: usize) -> BookDepth {
        BookDepth {
            bids: self.side_depth(Side::Buy, depth),
            asks: self.side_depth(Side::Sell, depth),
        }
    }

    /// Depth plus identity and sequencing.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            symbol: self.config.symbol.clone(),
            sequence: self.sequence,
            bids: self.side_depth(Side::Buy, depth),
            asks: self.side_depth(Side::Sell, depth),
        }
    }

    /// Most recent trades, oldest first, capped at `limit`.
    pub fn trades(&self, limit: usize) -> Vec<Trade> {
        let skip = self.trades.len().saturating_sub(limit);
        self.trades.iter().skip(skip).cloned().collect()
    }

    /// Most recent order events, oldest first, capped at `limit`.
    pub fn events(&self, limit: usize) -> Vec<OrderEvent> {
        let skip = self.events.len().saturating_sub(limit);
        self.events.iter().skip(skip).cloned().collect()
    }

    pub fn active_order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn best_bid(&self) -> Option<DepthLevel> {
        self.bids.first().map(|(_, level)| Self::level_row(level))
    }

    pub fn best_ask(&self) -> Option<DepthLevel> {
        self.asks.first().map(|(_, level)| Self::level_row(level))
    }

    /// A resting order by id, if any.
    pub fn get_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders
            .get(order_id)
            .map(|oref| &self.arena.get(oref.node).order)
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Checks run in a fixed order; the first failure names the reason.
    fn validate(&self, request: &SubmitOrderRequest) -> Result<(), Reason> {
        if request.symbol != self.config.symbol {
            return Err(Reason::SymbolMismatch);
        }
        if request.user_id.trim().is_empty() {
            return Err(Reason::MissingUserId);
        }
        if !request.quantity.is_positive() {
            return Err(Reason::InvalidQuantity);
        }
        if !request.quantity.is_multiple_of(self.config.lot_size) {
            return Err(Reason::QuantityNotLotMultiple);
        }
        if request.quantity < self.config.min_order_quantity {
            return Err(Reason::QuantityBelowMinimum);
        }
        match request.kind {
            OrderKind::Limit => {
                let Some(price) = request.price else {
                    return Err(Reason::InvalidLimitPrice);
                };
                if !price.is_multiple_of(self.config.tick_size) {
                    return Err(Reason::PriceNotTickMultiple);
                }
            }
            OrderKind::Market => {
                if request.price.is_some() {
                    return Err(Reason::MarketOrderCannotHavePrice);
                }
            }
        }
        if let Some(min) = request.min_quantity {
            if !min.is_positive() || min > request.quantity {
                return Err(Reason::InvalidMinQuantity);
            }
            if !min.is_multiple_of(self.config.lot_size) {
                return Err(Reason::MinQuantityNotLotMultiple);
            }
        }
        if let Some(display) = request.iceberg_display_quantity {
            if request.kind != OrderKind::Limit {
                return Err(Reason::IcebergRequiresLimitOrder);
            }
            if !display.is_positive()
                || display > request.quantity
                || !display.is_multiple_of(self.config.lot_size)
            {
                return Err(Reason::InvalidIcebergDisplayQuantity);
            }
        }
        Ok(())
    }

    /// FOK pre-check: sum visible quantity over crossing levels. Hidden
    /// iceberg reserve deliberately does not count.
    fn fok_fillable(&self, order: &Order) -> bool {
        let opposite = match order.side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        };
        let mut available = Quantity::zero();
        for (_, level) in opposite.entries(None) {
            if !Self::crosses(order, level.price()) {
                break;
            }
            available = available + level.total_visible_quantity();
            if available >= order.remaining_quantity {
                return true;
            }
        }
        available >= order.remaining_quantity
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build_order(&self, request: &SubmitOrderRequest, now_ms: i64) -> Order {
        let kind = request.kind;
        let display = request.iceberg_display_quantity.unwrap_or(request.quantity);
        Order {
            id: request.id.clone().unwrap_or_else(OrderId::generate),
            client_order_id: request.client_order_id.clone(),
            sequence: 0,
            symbol: request.symbol.clone(),
            user_id: request.user_id.clone(),
            side: request.side,
            kind,
            time_in_force: request
                .time_in_force
                .unwrap_or_else(|| TimeInForce::default_for(kind)),
            status: OrderStatus::New,
            original_quantity: request.quantity,
            remaining_quantity: request.quantity,
            display_quantity: display,
            // While taking, the full remainder is matchable; the iceberg
            // split is applied when the order rests.
            displayed_remaining_quantity: request.quantity,
            reserve_remaining_quantity: Quantity::zero(),
            min_quantity: request.min_quantity,
            price: request.price,
            self_trade_prevention: request.self_trade_prevention.unwrap_or_default(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    fn reject(&mut self, mut order: Order, reason: Reason, now_ms: i64) -> SubmitResult {
        order.status = OrderStatus::Rejected;
        order.updated_at_ms = now_ms;
        let event = self.record_event(&order, Some(reason), now_ms);
        order.sequence = event.sequence;
        SubmitResult {
            order,
            trades: Vec::new(),
            events: vec![event],
        }
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn record_event(&mut self, order: &Order, reason: Option<Reason>, now_ms: i64) -> OrderEvent {
        let sequence = self.next_sequence();
        let event = OrderEvent::new(
            order.id.clone(),
            order.status,
            reason,
            order.remaining_quantity,
            now_ms,
            sequence,
        );
        if self.events.len() == self.config.event_ring_capacity {
            self.events.pop_front();
        }
        self.events.push_back(event.clone());
        event
    }

    fn push_trade(&mut self, trade: Trade) {
        if self.trades.len() == self.config.trade_ring_capacity {
            self.trades.pop_front();
        }
        self.trades.push_back(trade);
    }

    /// Sort key encoding side direction: asks ascend, bids descend, so the
    /// skip list's minimum is always the best opposite price. Negative keys
    /// never leave the book.
    fn sort_key(side: Side, price: Price) -> Decimal {
        match side {
            Side::Buy => -price.as_decimal(),
            Side::Sell => price.as_decimal(),
        }
    }

    fn crosses(order: &Order, maker_price: Price) -> bool {
        match order.kind {
            OrderKind::Market => true,
            OrderKind::Limit => match (order.price, order.side) {
                (Some(limit), Side::Buy) => maker_price <= limit,
                (Some(limit), Side::Sell) => maker_price >= limit,
                (None, _) => false,
            },
        }
    }

    fn side_and_arena(&mut self, side: Side) -> (&mut SkipList<PriceLevel>, &mut NodeArena) {
        match side {
            Side::Buy => (&mut self.bids, &mut self.arena),
            Side::Sell => (&mut self.asks, &mut self.arena),
        }
    }

    fn side_depth(&self, side: Side, depth: usize) -> Vec<DepthLevel> {
        let index = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        index
            .entries(Some(depth))
            .into_iter()
            .map(|(_, level)| Self::level_row(level))
            .collect()
    }

    fn level_row(level: &PriceLevel) -> DepthLevel {
        DepthLevel {
            price: level.price(),
            quantity: level.total_visible_quantity(),
            order_count: level.order_count(),
        }
    }

    /// Post a resting order: get-or-create its level, append at the tail,
    /// and index it for cancel-by-id.
    fn rest(&mut self, order: Order) {
        let side = order.side;
        let Some(price) = order.price else {
            unreachable!("resting order without a price");
        };
        let key = Self::sort_key(side, price);
        let id = order.id.clone();
        let node = self.arena.insert(order);
        {
            let (index, arena) = self.side_and_arena(side);
            if index.get(key).is_none() {
                index.upsert(key, PriceLevel::new(price));
            }
            let Some(level) = index.get_mut(key) else {
                unreachable!("level missing after upsert");
            };
            level.append(arena, node);
        }
        self.orders.insert(id, OrderRef { side, price, node });
    }

    /// Unlink a resting order from its level, collapse the level if empty,
    /// and drop the id mapping.
    fn unlink_resting(&mut self, node: NodeIndex, side: Side, price: Price) -> Order {
        let key = Self::sort_key(side, price);
        let (order, level_empty) = {
            let (index, arena) = self.side_and_arena(side);
            let Some(level) = index.get_mut(key) else {
                unreachable!("resting order without a level");
            };
            let order = level.remove(arena, node);
            (order, level.is_empty())
        };
        if level_empty {
            let (index, _) = self.side_and_arena(side);
            index.remove(key);
        }
        self.orders.remove(&order.id);
        order
    }

    fn cancel_resting(
        &mut self,
        node: NodeIndex,
        side: Side,
        price: Price,
        reason: Reason,
        now_ms: i64,
    ) -> (Order, OrderEvent) {
        let mut order = self.unlink_resting(node, side, price);
        order.status = OrderStatus::Canceled;
        order.updated_at_ms = now_ms;
        let event = self.record_event(&order, Some(reason), now_ms);
        (order, event)
    }
}
