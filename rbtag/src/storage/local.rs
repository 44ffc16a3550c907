//! Local filesystem storage
//!
//! Tags are ID3v2 text frames (MP3 files, and the `id3 ` chunk of WAV
//! files). The duration comes from the audio properties read by lofty.

use super::{Storage, StorageError, StorageResult};
use crate::models::{StoredTags, TagValues};
use id3::{ErrorKind, Tag, TagLike, Version};
use lofty::prelude::*;
use lofty::probe::Probe;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

const FRAME_DATE: &str = "TDRC";
const FRAME_TRACK: &str = "TRCK";

/// Containers carrying an ID3v2 tag; id3 detects which from the content
const TAGGED_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

/// Storage backed by `std::fs`
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

fn ensure_taggable(path: &Path) -> StorageResult<()> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if TAGGED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(StorageError::Unsupported(path.to_path_buf()))
    }
}

fn tag_error(path: &Path, reason: impl ToString) -> StorageError {
    StorageError::Tag {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn ensure_parent(to: &Path) -> StorageResult<()> {
    if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Read the ID3 tag, or an empty one when the file has none
fn read_id3(path: &Path) -> StorageResult<Tag> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(tag),
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Ok(Tag::new()),
        Err(e) => Err(tag_error(path, e)),
    }
}

fn frame_text(tag: &Tag, id: &str) -> String {
    tag.get(id)
        .and_then(|frame| frame.content().text())
        .unwrap_or_default()
        .to_string()
}

fn set_frame_text(tag: &mut Tag, id: &str, value: &str) {
    if value.is_empty() {
        tag.remove(id);
    } else {
        tag.set_text(id, value);
    }
}

fn read_duration(path: &Path) -> StorageResult<f64> {
    let tagged_file = Probe::open(path)
        .map_err(|e| tag_error(path, e))?
        .read()
        .map_err(|e| tag_error(path, e))?;
    Ok(tagged_file.properties().duration().as_secs_f64())
}

impl Storage for LocalStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, dir: &Path) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))? {
            let entry = entry.map_err(|e| StorageError::io(dir, e))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn walk(&self, root: &Path) -> StorageResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(StorageError::NotFound(root.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(root = %root.display(), files = files.len(), "Walk complete");
        Ok(files)
    }

    fn copy(&self, from: &Path, to: &Path) -> StorageResult<()> {
        ensure_parent(to)?;
        fs::copy(from, to).map_err(|e| StorageError::io(from, e))?;
        Ok(())
    }

    fn move_file(&self, from: &Path, to: &Path) -> StorageResult<()> {
        ensure_parent(to)?;
        if let Err(rename_err) = fs::rename(from, to) {
            // Rename fails across devices; fall back to copy and delete
            if !from.exists() {
                return Err(StorageError::io(from, rename_err));
            }
            tracing::debug!(from = %from.display(), to = %to.display(), "Rename failed, copying: {}", rename_err);
            fs::copy(from, to).map_err(|e| StorageError::io(from, e))?;
            fs::remove_file(from).map_err(|e| StorageError::io(from, e))?;
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> StorageResult<()> {
        fs::remove_file(path).map_err(|e| StorageError::io(path, e))
    }

    fn read_tags(&self, path: &Path) -> StorageResult<StoredTags> {
        if !path.is_file() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        ensure_taggable(path)?;
        let tag = read_id3(path)?;

        Ok(StoredTags {
            artist: tag.artist().unwrap_or_default().to_string(),
            date: frame_text(&tag, FRAME_DATE),
            track: frame_text(&tag, FRAME_TRACK),
            title: tag.title().unwrap_or_default().to_string(),
            duration_seconds: read_duration(path)?,
        })
    }

    fn write_tags(&self, path: &Path, values: &TagValues) -> StorageResult<()> {
        if !path.is_file() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        ensure_taggable(path)?;
        let mut tag = read_id3(path)?;

        tag.set_artist(values.artist.as_str());
        tag.set_title(values.title.as_str());
        set_frame_text(&mut tag, FRAME_DATE, &values.date);
        set_frame_text(&mut tag, FRAME_TRACK, &values.track);

        tag.write_to_path(path, Version::Id3v24).map_err(|e| tag_error(path, e))
    }

    fn read_text(&self, path: &Path) -> StorageResult<String> {
        let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn modified(&self, path: &Path) -> StorageResult<SystemTime> {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| StorageError::io(path, e))
    }
}
