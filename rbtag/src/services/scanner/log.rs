//! Incremental scan of a synchronization diff-log
//!
//! The diff-log is free text. Multi-line templates pick out the lines that
//! announce a transferred file; the second capture group of a template's
//! last line is the file path, which must lie under one of the roots.

use super::{is_excluded, CandidateScanner, Collector, ScanOutcome};
use crate::error::ScanError;
use crate::services::filename_parser::Rejection;
use crate::storage::Storage;
use crate::RunContext;
use rbtag_common::config::{DiffLogSource, LineTemplate, Roots};
use regex::{Captures, Regex, RegexBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Template matching progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Idle,
    /// `line` is the index of the next template line to match
    Active { template: usize, line: usize },
}

/// Line-by-line template matcher
pub struct LogMatcher<'t> {
    templates: &'t [LineTemplate],
    state: MatchState,
}

impl<'t> LogMatcher<'t> {
    pub fn new(templates: &'t [LineTemplate]) -> Self {
        Self {
            templates,
            state: MatchState::Idle,
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Feed one line; returns the file path when a template completes
    ///
    /// When idle, the first template whose first line matches becomes
    /// active. While active, a line that does not match the expected
    /// template line aborts the template; that line is not retried as a
    /// first line.
    pub fn feed(&mut self, line: &str) -> Option<String> {
        match self.state {
            MatchState::Idle => {
                for (index, template) in self.templates.iter().enumerate() {
                    let first = match template.lines().first() {
                        Some(first) => first,
                        None => continue,
                    };
                    if let Some(captures) = first.captures(line) {
                        if template.len() == 1 {
                            return path_capture(&captures);
                        }
                        self.state = MatchState::Active {
                            template: index,
                            line: 1,
                        };
                        return None;
                    }
                }
                None
            }
            MatchState::Active { template, line: index } => {
                let lines = self.templates[template].lines();
                match lines.get(index).and_then(|pattern| pattern.captures(line)) {
                    Some(captures) if index + 1 == lines.len() => {
                        self.state = MatchState::Idle;
                        path_capture(&captures)
                    }
                    Some(_) => {
                        self.state = MatchState::Active {
                            template,
                            line: index + 1,
                        };
                        None
                    }
                    None => {
                        tracing::trace!(template, line = index, "Template aborted");
                        self.state = MatchState::Idle;
                        None
                    }
                }
            }
        }
    }
}

fn path_capture(captures: &Captures<'_>) -> Option<String> {
    captures
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|path| !path.is_empty())
}

/// Splits absolute paths from the diff-log against the storage roots
pub struct RootSplitter {
    pattern: Regex,
}

fn root_prefix(root: &Path) -> String {
    let mut prefix = root.to_string_lossy().replace('\\', "/");
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    prefix
}

impl RootSplitter {
    pub fn new(roots: &Roots) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = std::iter::once(&roots.local)
            .chain(roots.distant.as_ref())
            .map(|root| regex::escape(&root_prefix(root)))
            .collect();
        let pattern = RegexBuilder::new(&format!("({})(.*)", alternatives.join("|")))
            .case_insensitive(true)
            .build()?;
        Ok(Self { pattern })
    }

    /// Relative folder (trailing `/`) and filename, or `None` outside the roots
    pub fn split(&self, path: &str) -> Option<(String, String)> {
        let cut = path.rfind('/')?;
        let (folder, filename) = (&path[..=cut], &path[cut + 1..]);
        let captures = self.pattern.captures(folder)?;
        let relative_path = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        Some((relative_path.to_string(), filename.to_string()))
    }
}

/// Pick the diff-log to read: the configured file, or the newest matching
/// name in the configured folder
pub fn select_diff_log(storage: &dyn Storage, source: &DiffLogSource) -> Result<PathBuf, ScanError> {
    if storage.is_dir(&source.path) {
        let names = storage
            .list_dir(&source.path)
            .map_err(|e| ScanError::DiffLogRead {
                path: source.path.clone(),
                source: e,
            })?;
        names
            .into_iter()
            .filter(|name| source.signature.is_match(name))
            .max()
            .map(|name| source.path.join(name))
            .ok_or_else(|| ScanError::NoDiffLog(source.path.clone()))
    } else if storage.exists(&source.path) {
        Ok(source.path.clone())
    } else {
        Err(ScanError::DiffLogMissing(source.path.clone()))
    }
}

/// Reads the latest diff-log through the configured templates
pub struct LogScan<'a> {
    source: &'a DiffLogSource,
    templates: &'a [LineTemplate],
}

impl<'a> LogScan<'a> {
    pub fn new(source: &'a DiffLogSource, templates: &'a [LineTemplate]) -> Self {
        Self { source, templates }
    }
}

impl CandidateScanner for LogScan<'_> {
    fn scan(&self, ctx: &RunContext<'_>) -> Result<ScanOutcome, ScanError> {
        let path = select_diff_log(ctx.storage, self.source)?;
        tracing::info!(diff_log = %path.display(), "Scanning diff-log");

        let content = ctx
            .storage
            .read_text(&path)
            .map_err(|source| ScanError::DiffLogRead {
                path: path.clone(),
                source,
            })?;
        let splitter = RootSplitter::new(&ctx.settings.roots)?;

        let mut matcher = LogMatcher::new(self.templates);
        let mut collector = Collector::new(ctx);
        let mut seen = HashSet::new();

        for raw_line in content.lines() {
            let line = raw_line.replace('\\', "/");
            let file_path = match matcher.feed(line.trim_end()) {
                Some(file_path) => file_path,
                None => continue,
            };

            let (relative_path, filename) = match splitter.split(&file_path) {
                Some(parts) => parts,
                None => {
                    collector.reject("", &file_path, Rejection::OutsideRoots);
                    continue;
                }
            };

            if !seen.insert(format!("{}{}", relative_path, filename)) {
                tracing::debug!(file = %file_path, "Already listed in diff-log");
                continue;
            }

            if is_excluded(&ctx.settings.excluded_paths, &relative_path, &filename) {
                collector.reject(&relative_path, &filename, Rejection::Excluded);
            } else {
                collector.offer(&relative_path, &filename);
            }
        }

        Ok(collector.finish())
    }
}
