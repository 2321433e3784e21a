//! Virtual Mempool Service
//!
//! Models the async settlement of a blockchain-backed exchange: submissions
//! pay a simulated gas price, sit in a priority-ordered pending set, are
//! included at virtual block boundaries, execute against the matching
//! engine, and confirm probabilistically after a minimum depth. Also hosts
//! the translator that turns drained onchain action-queue records into
//! mempool submissions.

pub mod pool;
pub mod service;
pub mod transaction;
pub mod translator;

pub use pool::{
    BlockReport, MempoolConfig, SubmitHandle, VirtualMempool, FORCED_CONFIRMATION_EXTRA_BLOCKS,
};
pub use service::{MempoolService, SimState};
pub use transaction::{CommandOutcome, TxStatus, VirtualTransaction};
pub use translator::{
    drain_into, translate, DrainReport, OnchainAction, TranslateError, TranslatedAction,
};
