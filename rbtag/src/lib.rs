//! rbtag - radio episode archive tagger
//!
//! Keeps broadcast episode files of each program tagged and named
//! canonically, maintains `current`/`previous` copies for programs that
//! keep history, and mirrors every change to a distant root.
//!
//! There is no global state: a [`RunContext`] carrying the settings, the
//! storage backend and the program roster is handed to every component.

pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ArchiveError, ScanError};

use rbtag_common::config::Settings;
use services::ProgramDirectory;
use std::path::Path;
use storage::Storage;

/// Everything a run needs, borrowed for its duration
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub settings: &'a Settings,
    pub storage: &'a dyn Storage,
    pub programs: &'a ProgramDirectory,
}

impl<'a> RunContext<'a> {
    pub fn new(settings: &'a Settings, storage: &'a dyn Storage, programs: &'a ProgramDirectory) -> Self {
        Self {
            settings,
            storage,
            programs,
        }
    }

    /// Dry-run mode
    pub fn no_action(&self) -> bool {
        self.settings.no_action
    }

    pub fn local_root(&self) -> &Path {
        &self.settings.roots.local
    }

    /// Distant root, when changes are replicated
    pub fn replication_root(&self) -> Option<&Path> {
        self.settings.replication_root()
    }
}
