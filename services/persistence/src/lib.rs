//! Persistence — command log and state-sync snapshots
//!
//! Two durable artifacts back the simulator: an append-only JSONL command
//! log that makes every mutation replayable, and a periodically rewritten
//! state-sync document carrying book snapshots and engine stats.

pub mod command_log;
pub mod state_sync;

pub use command_log::{CommandEntry, CommandLog, CommandReadResult, EntryType, LogEntry, LogError};
pub use state_sync::{StateSyncDocument, StateSyncWriter, SyncError};
