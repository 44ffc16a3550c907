//! Archive slots

use std::fmt;

/// One of the three versions kept for a program
///
/// `Source` is the broadcast file itself. `Current` and `Previous` are the
/// rolling copies kept under the current folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveSlot {
    Source,
    Current,
    Previous,
}

impl ArchiveSlot {
    /// Slot name, used in current/previous filenames
    pub fn name(self) -> &'static str {
        match self {
            ArchiveSlot::Source => "source",
            ArchiveSlot::Current => "current",
            ArchiveSlot::Previous => "previous",
        }
    }

    /// Title marker distinguishing copies from the source
    pub fn marker(self) -> Option<&'static str> {
        match self {
            ArchiveSlot::Source => None,
            ArchiveSlot::Current => Some("C#"),
            ArchiveSlot::Previous => Some("P#"),
        }
    }
}

impl fmt::Display for ArchiveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
