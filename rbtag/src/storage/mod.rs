//! Storage backend
//!
//! Every filesystem access of the archive logic goes through [`Storage`]:
//! the local implementation in production, an in-memory one in tests.

pub mod local;

pub use local::LocalStorage;

use crate::models::{StoredTags, TagValues};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Embedded tags could not be read or written
    #[error("Tag error on {path}: {reason}")]
    Tag { path: PathBuf, reason: String },

    #[error("Unsupported audio format: {0}")]
    Unsupported(PathBuf),
}

impl StorageError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_path_buf())
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Narrow filesystem interface consumed by the archive logic
pub trait Storage {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Names of the regular files directly inside `dir`, sorted
    fn list_dir(&self, dir: &Path) -> StorageResult<Vec<String>>;

    /// Every regular file below `root`, in a stable order
    fn walk(&self, root: &Path) -> StorageResult<Vec<PathBuf>>;

    /// Copy a file, creating the destination folder when missing
    fn copy(&self, from: &Path, to: &Path) -> StorageResult<()>;

    /// Move a file, creating the destination folder when missing
    fn move_file(&self, from: &Path, to: &Path) -> StorageResult<()>;

    fn remove(&self, path: &Path) -> StorageResult<()>;

    fn read_tags(&self, path: &Path) -> StorageResult<StoredTags>;

    fn write_tags(&self, path: &Path, values: &TagValues) -> StorageResult<()>;

    /// Whole text file (roster, diff-log), invalid UTF-8 replaced
    fn read_text(&self, path: &Path) -> StorageResult<String>;

    fn modified(&self, path: &Path) -> StorageResult<SystemTime>;
}
