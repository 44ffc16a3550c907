//! In-memory view of the three archive slots of one episode

use super::ArchiveSlot;
use crate::services::tag_model::TagModel;

/// A loaded slot: its tag model and where the file lives
#[derive(Debug, Clone)]
pub struct SlotEntry {
    pub model: TagModel,
    /// Root-relative file path, `/`-separated
    pub location: String,
}

/// Up to three tag snapshots keyed by slot
///
/// The source slot is always present. Owned by one archive manager for the
/// time it takes to process a single file.
#[derive(Debug, Clone)]
pub struct EpisodeArchive {
    source: SlotEntry,
    current: Option<SlotEntry>,
    previous: Option<SlotEntry>,
}

impl EpisodeArchive {
    pub fn new(source: SlotEntry) -> Self {
        Self {
            source,
            current: None,
            previous: None,
        }
    }

    pub fn source(&self) -> &SlotEntry {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut SlotEntry {
        &mut self.source
    }

    pub fn get(&self, slot: ArchiveSlot) -> Option<&SlotEntry> {
        match slot {
            ArchiveSlot::Source => Some(&self.source),
            ArchiveSlot::Current => self.current.as_ref(),
            ArchiveSlot::Previous => self.previous.as_ref(),
        }
    }

    pub fn contains(&self, slot: ArchiveSlot) -> bool {
        self.get(slot).is_some()
    }

    /// Model used to compute a slot's names; an empty slot borrows the source view
    pub fn view(&self, slot: ArchiveSlot) -> &TagModel {
        self.get(slot).map_or(&self.source.model, |entry| &entry.model)
    }

    pub fn insert(&mut self, slot: ArchiveSlot, entry: SlotEntry) {
        match slot {
            ArchiveSlot::Source => self.source = entry,
            ArchiveSlot::Current => self.current = Some(entry),
            ArchiveSlot::Previous => self.previous = Some(entry),
        }
    }

    /// Empty a copy slot; the source slot cannot be emptied
    pub fn remove(&mut self, slot: ArchiveSlot) -> Option<SlotEntry> {
        match slot {
            ArchiveSlot::Source => None,
            ArchiveSlot::Current => self.current.take(),
            ArchiveSlot::Previous => self.previous.take(),
        }
    }
}
