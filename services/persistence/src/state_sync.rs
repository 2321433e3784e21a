//! State Sync — periodic JSON snapshot of engine state
//!
//! A single JSON document with the sync timestamp, an optional upstream
//! block number from an external observer, engine stats, and depth
//! snapshots per book. The document is rewritten atomically (temp file +
//! rename) so a reader never sees a torn write, and carries a SHA-256 hash
//! over the book snapshots so two runs can be diffed by hash alone.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::{BookSnapshot, EngineStatsSnapshot};

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Document ────────────────────────────────────────────────────────

/// The on-disk state-sync document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSyncDocument {
    /// ISO-8601 timestamp of the sync.
    pub synced_at: String,
    /// Block height reported by an out-of-scope upstream observer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_block_number: Option<u64>,
    pub stats: EngineStatsSnapshot,
    pub books: Vec<BookSnapshot>,
    /// SHA-256 over the serialized book snapshots.
    pub state_hash: String,
}

impl StateSyncDocument {
    /// Build a document, computing the state hash.
    pub fn new(
        synced_at: DateTime<Utc>,
        upstream_block_number: Option<u64>,
        stats: EngineStatsSnapshot,
        books: Vec<BookSnapshot>,
    ) -> Result<Self, SyncError> {
        let state_hash = Self::hash_books(&books)?;
        Ok(Self {
            synced_at: synced_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            upstream_block_number,
            stats,
            books,
            state_hash,
        })
    }

    fn hash_books(books: &[BookSnapshot]) -> Result<String, SyncError> {
        let bytes = serde_json::to_vec(books)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Recompute the hash and compare against the stored one.
    pub fn verify_integrity(&self) -> bool {
        Self::hash_books(&self.books)
            .map(|h| h == self.state_hash)
            .unwrap_or(false)
    }
}

// ── Writer ──────────────────────────────────────────────────────────

/// Writes state-sync documents atomically to a fixed path.
#[derive(Debug, Clone)]
pub struct StateSyncWriter {
    path: PathBuf,
}

impl StateSyncWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and write: create directory, write temp file, rename over.
    pub fn write(&self, document: &StateSyncDocument) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Load the current document, if one has been written.
    pub fn read(&self) -> Result<Option<StateSyncDocument>, SyncError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let doc = serde_json::from_str(&raw)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;
        Ok(Some(doc))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
