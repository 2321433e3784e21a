//! Shared domain types for the CLOB exchange simulator
//!
//! Identifier newtypes, decimal numerics, the order/trade/event data model,
//! replayable commands, stable reason strings, and the structured results
//! shared across the engine, mempool, and persistence crates.

pub mod commands;
pub mod errors;
pub mod events;
pub mod ids;
pub mod numeric;
pub mod order;
pub mod reason;
pub mod results;
pub mod snapshot;
pub mod stats;
pub mod trade;

pub use commands::{CancelOrderCommand, Command, SubmitOrderCommand};
pub use errors::EngineError;
pub use events::OrderEvent;
pub use ids::{CommandId, EventId, OrderId, Symbol, TradeId, TxId};
pub use numeric::{Price, Quantity};
pub use order::{Order, OrderKind, OrderStatus, SelfTradePrevention, Side, SubmitOrderRequest, TimeInForce};
pub use reason::Reason;
pub use results::{CancelResult, SubmitResult};
pub use snapshot::{BookDepth, BookSnapshot, DepthLevel};
pub use stats::EngineStatsSnapshot;
pub use trade::Trade;
