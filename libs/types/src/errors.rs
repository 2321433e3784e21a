//! Typed operational errors
//!
//! These are programming or environment errors, distinct from validation
//! failures (which surface as REJECTED orders with stable reason strings).

use thiserror::Error;

/// Errors returned by the matching engine's operational surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Unknown symbol on a read or submit path. The engine serves a fixed
    /// set of books bound at construction.
    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    /// The command log rejected a write.
    #[error("command log error: {message}")]
    CommandLog { message: String },
}
