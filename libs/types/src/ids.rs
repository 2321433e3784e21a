//! Identifier types for simulator entities
//!
//! Every id is a prefixed opaque string over a UUID v7, so ids are
//! time-sortable and greppable by kind (`ord-`, `trd-`, `evt-`, `vtx-`,
//! `cmd-`). Callers may also supply their own id strings; the generator is
//! only the default.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh id with the kind prefix.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), Uuid::now_v7()))
            }

            /// Wrap an existing id string (e.g. a caller-supplied order id).
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

opaque_id!(
    /// Unique identifier for an order.
    OrderId, "ord"
);
opaque_id!(
    /// Unique identifier for a trade.
    TradeId, "trd"
);
opaque_id!(
    /// Unique identifier for an order lifecycle event.
    EventId, "evt"
);
opaque_id!(
    /// Unique identifier for a virtual transaction.
    TxId, "vtx"
);
opaque_id!(
    /// Unique identifier for a logged command.
    CommandId, "cmd"
);

/// Market symbol (e.g. "ETH-USD").
///
/// Symbols are bound at engine construction; the engine serves a fixed set
/// of books.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// # Panics
    /// Panics if the symbol string is empty.
    pub fn new(symbol: impl Into<String>) -> Self {
        let s = symbol.into();
        assert!(!s.is_empty(), "Symbol must be non-empty");
        Self(s)
    }

    /// Try to create a Symbol, returning None if empty.
    pub fn try_new(symbol: impl Into<String>) -> Option<Self> {
        let s = symbol.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
