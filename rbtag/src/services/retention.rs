//! Log retention
//!
//! Removes run logs and diff-logs older than the retention period. Only
//! names matching the folder's pattern are considered. Dry-run mode only
//! reports what would be removed.

use crate::storage::{Storage, StorageResult};
use regex::Regex;
use std::path::Path;
use std::time::{Duration, SystemTime};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// What to prune
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub max_age: Duration,
    pub no_action: bool,
}

impl RetentionPolicy {
    pub fn new(retention_days: u32, no_action: bool) -> Self {
        Self {
            max_age: Duration::from_secs(u64::from(retention_days) * SECONDS_PER_DAY),
            no_action,
        }
    }

    /// Prune files of `dir` whose name matches `pattern`; returns how many
    /// were (or would be) removed
    pub fn prune(
        &self,
        storage: &dyn Storage,
        dir: &Path,
        pattern: &Regex,
        now: SystemTime,
    ) -> StorageResult<usize> {
        tracing::debug!(dir = %dir.display(), pattern = %pattern, "Pruning old files");
        let mut removed = 0;

        for name in storage.list_dir(dir)? {
            if !pattern.is_match(&name) {
                continue;
            }
            let path = dir.join(&name);
            let modified = storage.modified(&path)?;
            // Files dated in the future count as fresh
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= self.max_age {
                tracing::trace!(file = %name, "Kept");
                continue;
            }

            if self.no_action {
                tracing::info!(file = %path.display(), "Dry-run: would remove old file");
            } else {
                storage.remove(&path)?;
                tracing::info!(file = %path.display(), "Old file removed");
            }
            removed += 1;
        }

        Ok(removed)
    }
}
