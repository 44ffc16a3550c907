//! Full walk of the local root

use super::{contains_any, is_excluded, CandidateScanner, Collector, ScanOutcome};
use crate::error::ScanError;
use crate::services::filename_parser::Rejection;
use crate::RunContext;
use std::path::Path;

/// Walks the local root, keeping files that pass the inclusion filters
///
/// Each filter keeps a file when at least one of its terms occurs
/// (case-insensitively); an empty filter keeps everything.
pub struct DirectoryScan<'a> {
    /// Matched against relative path plus filename
    path_filter: &'a [String],
    /// Matched against the filename
    audio_filter: &'a [String],
}

impl<'a> DirectoryScan<'a> {
    pub fn new(path_filter: &'a [String], audio_filter: &'a [String]) -> Self {
        Self {
            path_filter,
            audio_filter,
        }
    }

    fn is_included(&self, relative_path: &str, filename: &str) -> bool {
        let path_ok = self.path_filter.is_empty()
            || contains_any(self.path_filter, &format!("{}{}", relative_path, filename));
        let audio_ok = self.audio_filter.is_empty() || contains_any(self.audio_filter, filename);
        path_ok && audio_ok
    }
}

/// Split a file below `root` into a `/`-separated relative folder (with a
/// trailing `/`, empty at the root) and its filename
pub fn split_relative(root: &Path, path: &Path) -> Option<(String, String)> {
    let relative = path.strip_prefix(root).ok()?;
    let filename = relative.file_name()?.to_string_lossy().into_owned();
    let folder: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    let relative_path = if folder.is_empty() {
        String::new()
    } else {
        format!("{}/", folder.join("/"))
    };
    Some((relative_path, filename))
}

impl CandidateScanner for DirectoryScan<'_> {
    fn scan(&self, ctx: &RunContext<'_>) -> Result<ScanOutcome, ScanError> {
        let root = &ctx.settings.roots.local;
        tracing::info!(root = %root.display(), "Scanning directory");

        let files = ctx.storage.walk(root).map_err(|source| ScanError::Walk {
            root: root.clone(),
            source,
        })?;

        let mut collector = Collector::new(ctx);
        for path in files {
            let (relative_path, filename) = match split_relative(root, &path) {
                Some(parts) => parts,
                None => continue,
            };

            if is_excluded(&ctx.settings.excluded_paths, &relative_path, &filename) {
                collector.reject(&relative_path, &filename, Rejection::Excluded);
            } else if !self.is_included(&relative_path, &filename) {
                collector.reject(&relative_path, &filename, Rejection::FilteredOut);
            } else {
                collector.offer(&relative_path, &filename);
            }
        }

        Ok(collector.finish())
    }
}
