//! Run orchestration
//!
//! Feeds scanner candidates, in order, through an [`ArchiveSlotManager`].
//! Failures are isolated per file; the only early exit is the change limit,
//! checked between files. Only files whose storage was written count as
//! changes, so a dry run plans every candidate.

use crate::error::ArchiveError;
use crate::models::{ArchiveSlot, FileIdentity, RunSummary};
use crate::services::archive_manager::ArchiveSlotManager;
use crate::RunContext;
use rbtag_common::ComparisonResult;

/// Result of processing one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FileOutcome {
    /// Storage was written
    changed: bool,
    warnings: usize,
}

/// Drives candidates through the archive manager
pub struct Orchestrator<'a> {
    ctx: &'a RunContext<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ctx: &'a RunContext<'a>) -> Self {
        Self { ctx }
    }

    /// Process candidates in order, updating `summary`
    pub fn run(&self, candidates: &[FileIdentity], summary: &mut RunSummary) {
        let limit = self.ctx.settings.change_limit;

        for identity in candidates {
            summary.processed += 1;
            let file = identity.relative_file();
            tracing::info!(file = %file, artist = %identity.artist, "Processing");

            match self.process(identity) {
                Ok(outcome) => {
                    summary.warnings += outcome.warnings;
                    if outcome.changed {
                        summary.changes += 1;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    tracing::error!(file = %file, "{}", e);
                    summary.errors += 1;
                }
                Err(e) => {
                    tracing::error!(
                        file = %file,
                        artist = %identity.artist,
                        date = %identity.date,
                        track = %identity.track,
                        "Unexpected error: {}",
                        e
                    );
                    summary.errors += 1;
                    summary.changes += 1;
                }
            }

            if limit > 0 && summary.changes >= limit {
                tracing::warn!(limit, "Change limit reached, stopping");
                summary.limit_reached = true;
                break;
            }
        }
    }

    fn process(&self, identity: &FileIdentity) -> Result<FileOutcome, ArchiveError> {
        let mut manager = ArchiveSlotManager::new(self.ctx, identity)?;
        let mut outcome = FileOutcome::default();

        if manager.tags_match() {
            tracing::debug!(file = %identity.filename, "Tags up to date");
        } else {
            outcome.changed |= manager.correct_tags()?;
        }

        if identity.requires_history {
            outcome.changed |= manager.rollover()?;
        } else {
            tracing::info!(artist = %identity.artist, "No history kept for this program");
        }

        match manager.filename_matches() {
            ComparisonResult::Equal => {}
            cmp if self.ctx.settings.auto_correct_filename => {
                tracing::debug!(file = %identity.filename, ?cmp, "Correcting filename");
                outcome.changed |= manager.correct_filename()?;
            }
            cmp => {
                tracing::warn!(
                    file = %identity.filename,
                    expected = %manager.calculated_location(ArchiveSlot::Source),
                    ?cmp,
                    "Filename is not canonical"
                );
                outcome.warnings += 1;
            }
        }

        Ok(outcome)
    }
}
