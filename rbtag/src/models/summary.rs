//! Run statistics

use std::fmt;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Identities produced by the scanner
    pub candidates: usize,
    /// Identities handed to the archive manager
    pub processed: usize,
    /// Files with at least one mutation (planned, in dry-run mode)
    pub changes: usize,
    pub warnings: usize,
    pub errors: usize,
    /// Processing stopped at the change limit
    pub limit_reached: bool,
}

impl RunSummary {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidate(s), {} processed, {} changed, {} warning(s), {} error(s)",
            self.candidates, self.processed, self.changes, self.warnings, self.errors
        )?;
        if self.limit_reached {
            write!(f, " (change limit reached)")?;
        }
        Ok(())
    }
}
