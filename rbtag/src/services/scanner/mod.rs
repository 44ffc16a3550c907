//! Candidate discovery
//!
//! Two front ends feed the orchestrator: a full walk of the local root
//! ([`DirectoryScan`]) and an incremental read of the latest diff-log
//! ([`LogScan`]). Both apply the exclusion filter first, resolve filenames
//! through [`FilenameParser`], and return candidates newest-first.

pub mod directory;
pub mod log;

pub use directory::DirectoryScan;
pub use log::{LogMatcher, LogScan};

use crate::error::ScanError;
use crate::models::FileIdentity;
use crate::services::filename_parser::{FilenameParser, Rejection};
use crate::RunContext;
use rbtag_common::config::ScanMode;

/// Scanner output
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Sorted newest-first
    pub candidates: Vec<FileIdentity>,
    pub rejected: usize,
    /// Rejections reported as warnings (unknown artists)
    pub warnings: usize,
}

/// A candidate discovery strategy
pub trait CandidateScanner {
    fn scan(&self, ctx: &RunContext<'_>) -> Result<ScanOutcome, ScanError>;
}

/// Run the scanner selected by the configuration
pub fn scan(ctx: &RunContext<'_>) -> Result<ScanOutcome, ScanError> {
    match &ctx.settings.scan {
        ScanMode::Directory {
            path_filter,
            audio_filter,
        } => DirectoryScan::new(path_filter, audio_filter).scan(ctx),
        ScanMode::Log { templates } => match &ctx.settings.diff_log {
            Some(source) => LogScan::new(source, templates).scan(ctx),
            None => Err(ScanError::DiffLogNotConfigured),
        },
    }
}

/// True when any excluded term occurs in the relative path plus filename
pub fn is_excluded(excluded: &[String], relative_path: &str, filename: &str) -> bool {
    contains_any(excluded, &format!("{}{}", relative_path, filename))
}

/// Case-insensitive substring test; `terms` are lowercase
pub(crate) fn contains_any(terms: &[String], haystack: &str) -> bool {
    let haystack = haystack.to_lowercase();
    terms.iter().any(|term| haystack.contains(term.as_str()))
}

/// Sort newest-first on the sort key, keeping discovery order for ties
pub fn sort_candidates(candidates: &mut [FileIdentity]) {
    candidates.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
}

/// Accumulates parse results into a [`ScanOutcome`]
pub(crate) struct Collector<'a> {
    parser: FilenameParser<'a>,
    outcome: ScanOutcome,
}

impl<'a> Collector<'a> {
    pub(crate) fn new(ctx: &'a RunContext<'a>) -> Self {
        Self {
            parser: FilenameParser::new(
                &ctx.settings.audio_signature,
                &ctx.settings.allowed_extensions,
                ctx.programs,
            ),
            outcome: ScanOutcome::default(),
        }
    }

    pub(crate) fn reject(&mut self, relative_path: &str, filename: &str, rejection: Rejection) {
        tracing::debug!(path = %relative_path, file = %filename, reason = %rejection, "Candidate rejected");
        if rejection.is_warning() {
            self.outcome.warnings += 1;
        }
        self.outcome.rejected += 1;
    }

    pub(crate) fn offer(&mut self, relative_path: &str, filename: &str) {
        match self.parser.parse(relative_path, filename) {
            Ok(identity) => self.outcome.candidates.push(identity),
            Err(rejection) => self.reject(relative_path, filename, rejection),
        }
    }

    pub(crate) fn finish(mut self) -> ScanOutcome {
        sort_candidates(&mut self.outcome.candidates);
        tracing::info!(
            candidates = self.outcome.candidates.len(),
            rejected = self.outcome.rejected,
            "Scan complete"
        );
        self.outcome
    }
}
