//! Matching engine — multi-symbol orchestration
//!
//! Routes submissions to per-symbol books, maintains the secondary
//! order-id → symbol map for cancels without a symbol hint, keeps cumulative
//! counters and the rolling latency window, persists every command to the
//! log before applying it, and fans out typed events.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use determinism::SimRng;
use persistence::CommandLog;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use types::{
    BookDepth, BookSnapshot, CancelResult, Command, EngineError, EngineStatsSnapshot, OrderId,
    OrderStatus, Reason, SubmitOrderRequest, SubmitResult, Symbol, Trade,
};

use crate::book::{BookConfig, OrderBook};
use crate::events::{EngineEvent, EventBus};
use crate::stats::EngineStats;

/// Depth used for fan-out snapshots and read defaults.
const DEFAULT_DEPTH: usize = 10;

/// One market served by the engine.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub symbol: Symbol,
    pub tick_size: Decimal,
    pub lot_size: Decimal,
}

impl MarketConfig {
    pub fn new(symbol: Symbol, tick_size: Decimal, lot_size: Decimal) -> Self {
        Self {
            symbol,
            tick_size,
            lot_size,
        }
    }
}

/// Engine construction parameters. The symbol set is fixed for the engine's
/// lifetime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub markets: Vec<MarketConfig>,
    pub seed: u64,
}

impl EngineConfig {
    pub fn new(markets: Vec<MarketConfig>, seed: u64) -> Self {
        Self { markets, seed }
    }
}

/// Outcome of replaying the command log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: u64,
    pub skipped: u64,
}

/// Multi-symbol matching engine.
pub struct MatchingEngine {
    books: BTreeMap<Symbol, OrderBook>,
    /// Secondary index for cancel-by-id without a symbol hint.
    order_symbols: HashMap<OrderId, Symbol>,
    stats: EngineStats,
    bus: EventBus,
    command_log: Option<CommandLog>,
    replaying: bool,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = SimRng::new(config.seed);
        let mut books = BTreeMap::new();
        for market in config.markets {
            let book_config =
                BookConfig::new(market.symbol.clone(), market.tick_size, market.lot_size);
            books.insert(market.symbol, OrderBook::new(book_config, &rng));
        }
        Self {
            books,
            order_symbols: HashMap::new(),
            stats: EngineStats::new(),
            bus: EventBus::default(),
            command_log: None,
            replaying: false,
        }
    }

    /// Attach a command log; every mutation is appended before it applies.
    pub fn with_command_log(mut self, log: CommandLog) -> Self {
        self.command_log = Some(log);
        self
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Submit an order.
    ///
    /// Unknown symbols are a typed error. Everything else, validation
    /// failures included, comes back as a structured result.
    pub fn submit_order(
        &mut self,
        mut request: SubmitOrderRequest,
        now_ms: i64,
    ) -> Result<SubmitResult, EngineError> {
        let started = Instant::now();
        let symbol = request.symbol.clone();
        if !self.books.contains_key(&symbol) {
            return Err(EngineError::UnknownSymbol {
                symbol: symbol.to_string(),
            });
        }

        // Ids are fixed before the command is logged so replay sees them.
        if request.id.is_none() {
            request.id = Some(OrderId::generate());
        }
        let command = Command::submit(request.clone());
        self.persist_command(&command, now_ms)?;

        let result = {
            let Some(book) = self.books.get_mut(&symbol) else {
                unreachable!("symbol checked above");
            };
            book.submit_order(request, now_ms)
        };

        self.stats.orders_submitted += 1;
        self.stats.trades_executed += result.trades.len() as u64;
        match result.order.status {
            OrderStatus::Rejected => self.stats.rejected_orders += 1,
            OrderStatus::Expired => self.stats.expired_orders += 1,
            _ => {}
        }

        if !result.order.status.is_terminal() {
            self.order_symbols
                .insert(result.order.id.clone(), symbol.clone());
        }
        for event in result.events.iter().skip(1) {
            if event.status.is_terminal() {
                self.order_symbols.remove(&event.order_id);
            }
        }

        self.fan_out_submission(&symbol, &result);
        self.append_event_record(
            serde_json::json!({
                "commandId": command.command_id(),
                "orderId": result.order.id.clone(),
                "status": result.order.status,
                "tradeCount": result.trades.len(),
            }),
            now_ms,
        );

        self.stats
            .record_latency(started.elapsed().as_secs_f64() * 1e6);
        tracing::debug!(
            order_id = %result.order.id,
            status = ?result.order.status,
            trades = result.trades.len(),
            "order submitted"
        );
        Ok(result)
    }

    /// Cancel an order, resolving its symbol from the hint or the secondary
    /// map. Unknown ids come back as `order_symbol_not_found`.
    pub fn cancel_order(
        &mut self,
        order_id: &OrderId,
        user_id: Option<&str>,
        symbol: Option<&Symbol>,
        now_ms: i64,
    ) -> CancelResult {
        let started = Instant::now();
        let resolved = symbol
            .cloned()
            .or_else(|| self.order_symbols.get(order_id).cloned());
        let Some(sym) = resolved.filter(|s| self.books.contains_key(s)) else {
            return CancelResult::failed(Reason::OrderSymbolNotFound);
        };

        let command = Command::cancel(
            order_id.clone(),
            user_id.map(|s| s.to_string()),
            symbol.cloned(),
        );
        if let Err(err) = self.persist_command(&command, now_ms) {
            tracing::warn!(%err, "cancel command not persisted");
        }

        let result = {
            let Some(book) = self.books.get_mut(&sym) else {
                unreachable!("symbol filtered above");
            };
            book.cancel_order(order_id, user_id, now_ms)
        };

        if result.canceled {
            self.order_symbols.remove(order_id);
            self.stats.orders_canceled += 1;
            if let Some(book) = self.books.get(&sym) {
                self.bus.publish(EngineEvent::Orderbook {
                    symbol: sym.clone(),
                    snapshot: book.snapshot(DEFAULT_DEPTH),
                });
            }
        }
        self.bus.publish(EngineEvent::CancelResult(result.clone()));
        self.append_event_record(
            serde_json::json!({
                "commandId": command.command_id(),
                "orderId": order_id,
                "canceled": result.canceled,
            }),
            now_ms,
        );

        self.stats
            .record_latency(started.elapsed().as_secs_f64() * 1e6);
        tracing::debug!(%order_id, canceled = result.canceled, "cancel processed");
        result
    }

    /// Re-apply commands from the log without re-persisting them. Fan-out
    /// events are re-emitted so downstream snapshots reproduce. A failing
    /// command is counted and skipped, never fatal.
    pub fn replay_from_command_log(
        &mut self,
        log: &CommandLog,
    ) -> Result<ReplayReport, EngineError> {
        let read = log.read_commands().map_err(|e| EngineError::CommandLog {
            message: e.to_string(),
        })?;

        self.replaying = true;
        let mut applied = 0u64;
        let mut skipped = 0u64;
        for entry in read.commands {
            match entry.command {
                Command::SubmitOrder(cmd) => {
                    match self.submit_order(cmd.request, entry.timestamp_ms) {
                        Ok(_) => applied += 1,
                        Err(err) => {
                            tracing::warn!(%err, "replay skipped failing submit");
                            skipped += 1;
                        }
                    }
                }
                Command::CancelOrder(cmd) => {
                    self.cancel_order(
                        &cmd.order_id,
                        cmd.user_id.as_deref(),
                        cmd.symbol.as_ref(),
                        entry.timestamp_ms,
                    );
                    applied += 1;
                }
            }
        }
        self.replaying = false;

        tracing::info!(
            applied,
            skipped,
            corrupt_lines = read.corrupt_lines,
            "command log replayed"
        );
        Ok(ReplayReport { applied, skipped })
    }

    // ── Read surface ────────────────────────────────────────────────

    pub fn snapshot(
        &self,
        symbol: &Symbol,
        depth: Option<usize>,
    ) -> Result<BookSnapshot, EngineError> {
        self.book_ref(symbol)
            .map(|book| book.snapshot(depth.unwrap_or(DEFAULT_DEPTH)))
    }

    pub fn depth(&self, symbol: &Symbol, depth: Option<usize>) -> Result<BookDepth, EngineError> {
        self.book_ref(symbol)
            .map(|book| book.depth(depth.unwrap_or(DEFAULT_DEPTH)))
    }

    pub fn trades(
        &self,
        symbol: &Symbol,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>, EngineError> {
        self.book_ref(symbol)
            .map(|book| book.trades(limit.unwrap_or(100)))
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot(self.active_order_count())
    }

    pub fn active_order_count(&self) -> usize {
        self.books.values().map(|b| b.active_order_count()).sum()
    }

    pub fn supported_symbols(&self) -> Vec<Symbol> {
        self.books.keys().cloned().collect()
    }

    /// Depth snapshots of every book, in symbol order (for state sync).
    pub fn all_snapshots(&self, depth: usize) -> Vec<BookSnapshot> {
        self.books.values().map(|b| b.snapshot(depth)).collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.bus.subscribe()
    }

    pub fn book(&self, symbol: &Symbol) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn book_ref(&self, symbol: &Symbol) -> Result<&OrderBook, EngineError> {
        self.books
            .get(symbol)
            .ok_or_else(|| EngineError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    fn persist_command(&self, command: &Command, now_ms: i64) -> Result<(), EngineError> {
        if self.replaying {
            return Ok(());
        }
        if let Some(log) = &self.command_log {
            log.append_command(command, now_ms)
                .map_err(|e| EngineError::CommandLog {
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Informational record after the command applied; ignored on read.
    fn append_event_record(&self, payload: serde_json::Value, now_ms: i64) {
        if self.replaying {
            return;
        }
        if let Some(log) = &self.command_log {
            if let Err(err) = log.append_event(payload, now_ms) {
                tracing::warn!(%err, "event record not persisted");
            }
        }
    }

    fn fan_out_submission(&self, symbol: &Symbol, result: &SubmitResult) {
        for trade in &result.trades {
            self.bus.publish(EngineEvent::Trade(trade.clone()));
        }
        if let Some(book) = self.books.get(symbol) {
            self.bus.publish(EngineEvent::Orderbook {
                symbol: symbol.clone(),
                snapshot: book.snapshot(DEFAULT_DEPTH),
            });
        }
        self.bus.publish(EngineEvent::OrderResult(result.clone()));
    }
}
