//! Command Log — append-only JSONL of commands and events
//!
//! One line per record. Commands are the replayable inputs; event records
//! are informational and ignored on read. The reader is tolerant: corrupted
//! or partial lines are skipped and counted, never fatal, so a torn tail
//! from an abrupt shutdown cannot block recovery.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::Command;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Records ─────────────────────────────────────────────────────────

/// Kind tag on every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Command,
    Event,
}

/// One log line. Field names are part of the on-disk contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub entry_type: EntryType,
    pub timestamp_ms: i64,
    pub payload: serde_json::Value,
}

/// A command recovered from the log, with the timestamp it was applied at.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEntry {
    pub command: Command,
    pub timestamp_ms: i64,
}

/// Result of a full log read.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReadResult {
    /// Command entries in file order.
    pub commands: Vec<CommandEntry>,
    /// Lines that failed to parse and were skipped.
    pub corrupt_lines: u64,
}

// ── Command Log ─────────────────────────────────────────────────────

/// Append-only command log at a fixed path.
///
/// Appends are scoped acquisitions: each call opens, writes one line, and
/// closes. The parent directory is created on first write; fsync is not
/// required.
#[derive(Debug, Clone)]
pub struct CommandLog {
    path: PathBuf,
}

impl CommandLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a command record. Must happen before the command is applied so
    /// replay sees exactly what the live engine saw.
    pub fn append_command(&self, command: &Command, timestamp_ms: i64) -> Result<(), LogError> {
        let payload = serde_json::to_value(command)
            .map_err(|e| LogError::Serialization(e.to_string()))?;
        self.append_line(&LogEntry {
            entry_type: EntryType::Command,
            timestamp_ms,
            payload,
        })
    }

    /// Append an informational event record. Ignored by `read_commands`.
    pub fn append_event(
        &self,
        payload: serde_json::Value,
        timestamp_ms: i64,
    ) -> Result<(), LogError> {
        self.append_line(&LogEntry {
            entry_type: EntryType::Event,
            timestamp_ms,
            payload,
        })
    }

    /// Read all command entries in file order.
    ///
    /// A missing file yields an empty result. Corrupt lines are skipped and
    /// counted.
    pub fn read_commands(&self) -> Result<CommandReadResult, LogError> {
        if !self.path.exists() {
            return Ok(CommandReadResult {
                commands: Vec::new(),
                corrupt_lines: 0,
            });
        }

        let file = fs::File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut commands = Vec::new();
        let mut corrupt_lines = 0u64;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: LogEntry = match serde_json::from_str(&line) {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(%err, "skipping corrupt command-log line");
                    corrupt_lines += 1;
                    continue;
                }
            };
            if entry.entry_type != EntryType::Command {
                continue;
            }
            match serde_json::from_value::<Command>(entry.payload) {
                Ok(command) => commands.push(CommandEntry {
                    command,
                    timestamp_ms: entry.timestamp_ms,
                }),
                Err(err) => {
                    tracing::warn!(%err, "skipping unparseable command payload");
                    corrupt_lines += 1;
                }
            }
        }

        Ok(CommandReadResult {
            commands,
            corrupt_lines,
        })
    }

    fn append_line(&self, entry: &LogEntry) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let line = serde_json::to_string(entry)
            .map_err(|e| LogError::Serialization(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::TempDir;
    use types::{OrderId, OrderKind, Quantity, Side, SubmitOrderRequest, Symbol};

    fn sample_request(user: &str) -> SubmitOrderRequest {
        SubmitOrderRequest {
            id: Some(OrderId::from_string(format!("ord-{}", user))),
            client_order_id: None,
            symbol: Symbol::new("ETH-USD"),
            user_id: user.into(),
            side: Side::Buy,
            kind: OrderKind::Limit,
            quantity: Quantity::from_u64(5),
            price: Some(types::Price::new(Decimal::from(100))),
            time_in_force: None,
            min_quantity: None,
            iceberg_display_quantity: None,
            self_trade_prevention: None,
        }
    }

    fn log_in(dir: &TempDir) -> CommandLog {
        CommandLog::new(dir.path().join("logs").join("commands.jsonl"))
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        let result = log.read_commands().unwrap();
        assert!(result.commands.is_empty());
        assert_eq!(result.corrupt_lines, 0);
    }

    #[test]
    fn test_append_and_read_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);

        let cmd_a = Command::submit(sample_request("alice"));
        let cmd_b = Command::cancel(OrderId::from_string("ord-alice"), None, None);
        log.append_command(&cmd_a, 1_000).unwrap();
        log.append_command(&cmd_b, 2_000).unwrap();

        let result = log.read_commands().unwrap();
        assert_eq!(result.commands.len(), 2);
        assert_eq!(result.commands[0].command, cmd_a);
        assert_eq!(result.commands[0].timestamp_ms, 1_000);
        assert_eq!(result.commands[1].command, cmd_b);
        assert_eq!(result.corrupt_lines, 0);
    }

    #[test]
    fn test_directory_created_on_first_write() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        assert!(!log.path().parent().unwrap().exists());
        log.append_command(&Command::submit(sample_request("alice")), 1)
            .unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_event_records_ignored_on_read() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        log.append_command(&Command::submit(sample_request("alice")), 1)
            .unwrap();
        log.append_event(serde_json::json!({"orderId": "ord-alice", "status": "NEW"}), 2)
            .unwrap();

        let result = log.read_commands().unwrap();
        assert_eq!(result.commands.len(), 1);
        assert_eq!(result.corrupt_lines, 0);
    }

    #[test]
    fn test_corrupt_lines_skipped_and_counted() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        log.append_command(&Command::submit(sample_request("alice")), 1)
            .unwrap();
        // Torn tail: half a record from an abrupt shutdown
        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        writeln!(file, "{{\"entryType\":\"command\",\"timest").unwrap();
        log.append_command(&Command::submit(sample_request("bob")), 3)
            .unwrap();

        let result = log.read_commands().unwrap();
        assert_eq!(result.commands.len(), 2);
        assert_eq!(result.corrupt_lines, 1);
    }

    #[test]
    fn test_wire_field_names() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        log.append_command(&Command::submit(sample_request("alice")), 42)
            .unwrap();
        let raw = fs::read_to_string(log.path()).unwrap();
        assert!(raw.contains("\"entryType\":\"command\""));
        assert!(raw.contains("\"timestampMs\":42"));
        assert!(raw.contains("\"commandId\":\"cmd-"));
    }
}
