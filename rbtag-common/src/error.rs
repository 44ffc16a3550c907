//! Common error types for rbtag
//!
//! Everything here is fatal: a run aborts before any audio file is touched.

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for rbtag startup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error types shared by the rbtag crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Program roster could not be read or contains an invalid entry
    #[error("Cannot read program roster {path}: {reason}")]
    RosterRead {
        /// Roster file path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },
}
