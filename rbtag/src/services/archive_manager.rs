//! Archive slot manager
//!
//! Owns the source/current/previous tag models of one episode and applies
//! tag correction, filename correction and the current/previous rollover.
//!
//! Every mutation is done on the local root first, then, when replication
//! is enabled, on the distant root:
//! - moves retag and rename the distant file independently
//! - copies push the new local file to the distant root as a byte copy
//!
//! There is no rollback: a failure on the distant side leaves the local
//! change in place. In dry-run mode mutations are logged and applied to the
//! in-memory archive only, so the rest of the plan is still reported.

use crate::error::ArchiveError;
use crate::models::archive::SlotEntry;
use crate::models::{ArchiveSlot, EpisodeArchive, FileIdentity, StoredTags, TagKey};
use crate::services::tag_model::TagModel;
use crate::storage::StorageError;
use crate::RunContext;
use rbtag_common::{compare_str, ComparisonResult};
use std::path::{Path, PathBuf};

/// Manages the three slots of one episode
pub struct ArchiveSlotManager<'a> {
    ctx: &'a RunContext<'a>,
    identity: FileIdentity,
    archive: EpisodeArchive,
}

fn root_relative(folder: &Path) -> String {
    let mut folder = folder.to_string_lossy().replace('\\', "/");
    if !folder.is_empty() && !folder.ends_with('/') {
        folder.push('/');
    }
    folder
}

impl<'a> ArchiveSlotManager<'a> {
    /// Check the source exists on every root, read its tags and, for
    /// programs with history, load the current/previous copies
    pub fn new(ctx: &'a RunContext<'a>, identity: &FileIdentity) -> Result<Self, ArchiveError> {
        let location = identity.relative_file();

        let local = ctx.local_root().join(&location);
        if !ctx.storage.exists(&local) {
            return Err(ArchiveError::FileNotFound(local));
        }
        if let Some(distant_root) = ctx.replication_root() {
            let distant = distant_root.join(&location);
            if !ctx.storage.exists(&distant) {
                return Err(ArchiveError::FileNotFound(distant));
            }
        }

        let stored = read_tags(ctx, &local)?;
        let source = SlotEntry {
            model: TagModel::from_identity(identity, stored),
            location,
        };

        let mut manager = Self {
            ctx,
            identity: identity.clone(),
            archive: EpisodeArchive::new(source),
        };

        if identity.requires_history {
            for slot in [ArchiveSlot::Current, ArchiveSlot::Previous] {
                manager.load_copy(slot)?;
            }
        }

        Ok(manager)
    }

    fn load_copy(&mut self, slot: ArchiveSlot) -> Result<(), ArchiveError> {
        let location = self.calculated_location(slot);
        let path = self.ctx.local_root().join(&location);
        if !self.ctx.storage.exists(&path) {
            tracing::debug!(slot = %slot, file = %path.display(), "No copy on disk");
            return Ok(());
        }

        let stored = read_tags(self.ctx, &path)?;
        let model = TagModel::from_stored(slot, stored, &self.identity.extension);
        tracing::debug!(slot = %slot, id = %model.canonical_id(), "Copy loaded");
        self.archive.insert(slot, SlotEntry { model, location });
        Ok(())
    }

    pub fn identity(&self) -> &FileIdentity {
        &self.identity
    }

    pub fn archive(&self) -> &EpisodeArchive {
        &self.archive
    }

    /// Root-relative path a slot's file should have
    pub fn calculated_location(&self, slot: ArchiveSlot) -> String {
        let settings = self.ctx.settings;
        let filename = self
            .archive
            .view(slot)
            .filename_for(slot, &settings.filename_separator);
        match slot {
            ArchiveSlot::Source => format!("{}{}", self.identity.relative_path, filename),
            _ => format!("{}{}", root_relative(&settings.current_path), filename),
        }
    }

    /// Source title as calculated equals the stored one
    pub fn tags_match(&self) -> bool {
        self.archive.source().model.compare(TagKey::Title)
    }

    /// Rewrite the source tags, locally then on the distant root. Returns
    /// whether storage was written.
    pub fn correct_tags(&mut self) -> Result<bool, ArchiveError> {
        let source = self.archive.source();
        let values = source.model.values_for(ArchiveSlot::Source);
        let local = self.ctx.local_root().join(&source.location);

        let written = !self.ctx.no_action();
        if !written {
            tracing::info!(file = %local.display(), title = %values.title, "Dry-run: would correct tags");
        } else {
            self.ctx
                .storage
                .write_tags(&local, &values)
                .map_err(|e| tag_write(&local, e))?;
            tracing::info!(file = %local.display(), title = %values.title, "Tags corrected");

            if let Some(distant_root) = self.ctx.replication_root() {
                let distant = distant_root.join(&source.location);
                let stored = read_tags(self.ctx, &distant)?;
                let distant_values =
                    TagModel::from_identity(&self.identity, stored).values_for(ArchiveSlot::Source);
                self.ctx
                    .storage
                    .write_tags(&distant, &distant_values)
                    .map_err(|e| tag_write(&distant, e))?;
                tracing::info!(file = %distant.display(), "Distant tags corrected");
            }
        }

        self.archive.source_mut().model.mark_saved(&values);
        Ok(written)
    }

    /// Canonical filename compared with the actual one
    pub fn filename_matches(&self) -> ComparisonResult {
        let expected = self
            .archive
            .source()
            .model
            .filename_for(ArchiveSlot::Source, &self.ctx.settings.filename_separator);
        compare_str(&expected, &self.identity.filename)
    }

    /// Rename the source file to its canonical name
    pub fn correct_filename(&mut self) -> Result<bool, ArchiveError> {
        let moved = self.move_slot(ArchiveSlot::Source, ArchiveSlot::Source)?;
        let location = self.archive.source().location.clone();
        if let Some(filename) = location.rsplit('/').next() {
            self.identity.filename = filename.to_string();
        }
        Ok(moved)
    }

    /// Canonical IDs of source and `slot`, when `slot` is loaded
    fn compare_with(&self, slot: ArchiveSlot) -> Option<ComparisonResult> {
        let source_id = self.archive.source().model.canonical_id();
        self.archive
            .get(slot)
            .map(|entry| compare_str(&source_id, &entry.model.canonical_id()))
    }

    /// Update the current/previous copies from the source
    ///
    /// A source whose canonical ID is bigger than the current one is taken
    /// as the older episode: current moves to previous and the source
    /// becomes current. A smaller source only replaces a previous copy it
    /// is bigger than. Returns whether storage was written, so a dry run
    /// reports `false` for the same plan.
    pub fn rollover(&mut self) -> Result<bool, ArchiveError> {
        let cmp = match self.compare_with(ArchiveSlot::Current) {
            None => {
                tracing::info!(artist = %self.identity.artist, "No current copy");
                return self.copy_slot(ArchiveSlot::Source, ArchiveSlot::Current);
            }
            Some(cmp) => cmp,
        };

        tracing::debug!(artist = %self.identity.artist, ?cmp, "Source compared with current");
        match cmp {
            ComparisonResult::Bigger => {
                let moved = self.move_slot(ArchiveSlot::Current, ArchiveSlot::Previous)?;
                let copied = self.copy_slot(ArchiveSlot::Source, ArchiveSlot::Current)?;
                Ok(moved || copied)
            }
            ComparisonResult::Smaller => match self.compare_with(ArchiveSlot::Previous) {
                None | Some(ComparisonResult::Bigger) => {
                    self.copy_slot(ArchiveSlot::Source, ArchiveSlot::Previous)
                }
                Some(_) => {
                    tracing::debug!(artist = %self.identity.artist, "Previous copy kept");
                    Ok(false)
                }
            },
            ComparisonResult::Equal | ComparisonResult::Similar => Ok(false),
        }
    }

    /// Rebuild the model of a file holding `src` tags
    fn rebuild(&self, src: ArchiveSlot, stored: StoredTags) -> TagModel {
        match src {
            ArchiveSlot::Source => TagModel::from_identity(&self.identity, stored),
            slot => TagModel::from_stored(slot, stored, &self.identity.extension),
        }
    }

    /// Retag `src`'s file for `dst` and rename it to `dst`'s location
    pub fn move_slot(&mut self, src: ArchiveSlot, dst: ArchiveSlot) -> Result<bool, ArchiveError> {
        let entry = match self.archive.get(src) {
            Some(entry) => entry.clone(),
            None => {
                tracing::debug!(slot = %src, "Nothing to move");
                return Ok(false);
            }
        };
        let target = self.calculated_location(dst);
        let values = entry.model.values_for(dst);
        let from = self.ctx.local_root().join(&entry.location);
        let to = self.ctx.local_root().join(&target);

        let written = !self.ctx.no_action();
        if !written {
            tracing::info!(from = %from.display(), to = %to.display(), "Dry-run: would retag and move");
        } else {
            let storage = self.ctx.storage;
            storage.write_tags(&from, &values).map_err(|e| tag_write(&from, e))?;
            storage.move_file(&from, &to).map_err(|e| move_error(&from, &to, e))?;
            tracing::info!(from = %from.display(), to = %to.display(), "Moved");

            if let Some(distant_root) = self.ctx.replication_root() {
                let from = distant_root.join(&entry.location);
                let to = distant_root.join(&target);
                let distant_values = self.rebuild(src, read_tags(self.ctx, &from)?).values_for(dst);
                storage
                    .write_tags(&from, &distant_values)
                    .map_err(|e| tag_write(&from, e))?;
                storage.move_file(&from, &to).map_err(|e| move_error(&from, &to, e))?;
                tracing::info!(from = %from.display(), to = %to.display(), "Distant copy moved");
            }
        }

        let mut model = entry.model.with_role(dst);
        model.mark_saved(&values);
        self.archive.remove(src);
        self.archive.insert(
            dst,
            SlotEntry {
                model,
                location: target,
            },
        );
        Ok(written)
    }

    /// Copy `src`'s file to `dst`'s location and retag the copy for `dst`
    pub fn copy_slot(&mut self, src: ArchiveSlot, dst: ArchiveSlot) -> Result<bool, ArchiveError> {
        let entry = match self.archive.get(src) {
            Some(entry) => entry.clone(),
            None => {
                tracing::debug!(slot = %src, "Nothing to copy");
                return Ok(false);
            }
        };
        let target = self.calculated_location(dst);
        let from = self.ctx.local_root().join(&entry.location);
        let to = self.ctx.local_root().join(&target);

        let written = !self.ctx.no_action();
        let model = if !written {
            tracing::info!(from = %from.display(), to = %to.display(), "Dry-run: would copy and retag");
            entry.model.with_role(dst)
        } else {
            let storage = self.ctx.storage;
            storage.copy(&from, &to).map_err(|e| copy_error(&from, &to, e))?;
            let rebuilt = self.rebuild(src, read_tags(self.ctx, &to)?);
            let values = rebuilt.values_for(dst);
            storage.write_tags(&to, &values).map_err(|e| tag_write(&to, e))?;
            tracing::info!(from = %from.display(), to = %to.display(), title = %values.title, "Copied");

            if let Some(distant_root) = self.ctx.replication_root() {
                let distant = distant_root.join(&target);
                storage
                    .copy(&to, &distant)
                    .map_err(|e| copy_error(&to, &distant, e))?;
                tracing::info!(to = %distant.display(), "Copy replicated");
            }

            let mut model = rebuilt.with_role(dst);
            model.mark_saved(&values);
            model
        };

        self.archive.insert(
            dst,
            SlotEntry {
                model,
                location: target,
            },
        );
        Ok(written)
    }
}

fn read_tags(ctx: &RunContext<'_>, path: &Path) -> Result<StoredTags, ArchiveError> {
    ctx.storage.read_tags(path).map_err(|source| ArchiveError::TagRead {
        path: path.to_path_buf(),
        source,
    })
}

fn tag_write(path: &Path, source: StorageError) -> ArchiveError {
    ArchiveError::TagWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn copy_error(from: &Path, to: &Path, source: StorageError) -> ArchiveError {
    ArchiveError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}

fn move_error(from: &Path, to: &Path, source: StorageError) -> ArchiveError {
    ArchiveError::Move {
        from: PathBuf::from(from),
        to: PathBuf::from(to),
        source,
    }
}
