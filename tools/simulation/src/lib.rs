//! Simulation tooling
//!
//! The network shim that fronts submission paths, plus the end-to-end
//! scenario tests exercising the engine, mempool, and persistence crates
//! together (under `tests/`).

pub mod net_shim;

pub use net_shim::{NetworkShim, ShimConfig, ShimOutcome};
