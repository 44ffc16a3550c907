//! Per-file and scan error types
//!
//! Fatal startup errors live in `rbtag_common::Error`. The types here are
//! caught by the orchestrator: one file fails, the run goes on.

use crate::storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while processing one archive entry
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Source file missing on the local or distant root
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Tag write failed for {path}: {source}")]
    TagWrite {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Copy {from} -> {to} failed: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Move {from} -> {to} failed: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: StorageError,
    },

    /// Tags of an existing file could not be read
    #[error("Tag read failed for {path}: {source}")]
    TagRead {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
}

impl ArchiveError {
    /// Expected per-file failures; anything else is reported with context
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ArchiveError::TagRead { .. })
    }
}

/// Errors preventing a scanner from producing candidates
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No diff-log source configured")]
    DiffLogNotConfigured,

    #[error("Diff-log path not found: {0}")]
    DiffLogMissing(PathBuf),

    #[error("No diff-log matching the signature in {0}")]
    NoDiffLog(PathBuf),

    #[error("Cannot read diff-log {path}: {source}")]
    DiffLogRead {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Cannot walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Invalid root pattern: {0}")]
    RootPattern(#[from] regex::Error),
}
