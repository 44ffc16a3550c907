//! Data model shared by the scanners, the tag model and the archive manager

pub mod archive;
pub mod identity;
pub mod slot;
pub mod summary;
pub mod tags;

pub use archive::EpisodeArchive;
pub use identity::{CanonicalProgram, FileIdentity};
pub use slot::ArchiveSlot;
pub use summary::RunSummary;
pub use tags::{StoredTags, TagKey, TagValues};
