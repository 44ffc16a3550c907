//! In-memory storage backend
//!
//! Records every successful copy, move, tag write and removal so tests can
//! assert on the exact sequence of operations. Failures can be injected per
//! operation kind and path.

use rbtag::models::{StoredTags, TagValues};
use rbtag::storage::{Storage, StorageError, StorageResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A recorded mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Copy { from: PathBuf, to: PathBuf },
    Move { from: PathBuf, to: PathBuf },
    WriteTags { path: PathBuf, values: TagValues },
    Remove(PathBuf),
}

/// Operation kinds that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Copy,
    Move,
    WriteTags,
    ReadTags,
}

#[derive(Debug, Clone)]
pub struct MemoryFile {
    pub tags: StoredTags,
    pub text: String,
    pub modified: SystemTime,
}

#[derive(Default)]
pub struct MemoryStorage {
    files: RefCell<BTreeMap<PathBuf, MemoryFile>>,
    ops: RefCell<Vec<Op>>,
    failures: RefCell<Vec<(FailOn, PathBuf)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_audio(&self, path: impl AsRef<Path>, tags: StoredTags) {
        self.files.borrow_mut().insert(
            path.as_ref().to_path_buf(),
            MemoryFile {
                tags,
                text: String::new(),
                modified: SystemTime::now(),
            },
        );
    }

    pub fn add_text(&self, path: impl AsRef<Path>, text: &str) {
        self.add_text_modified(path, text, SystemTime::now());
    }

    pub fn add_text_modified(&self, path: impl AsRef<Path>, text: &str, modified: SystemTime) {
        self.files.borrow_mut().insert(
            path.as_ref().to_path_buf(),
            MemoryFile {
                tags: StoredTags::default(),
                text: text.to_string(),
                modified,
            },
        );
    }

    pub fn tags(&self, path: impl AsRef<Path>) -> Option<StoredTags> {
        self.files.borrow().get(path.as_ref()).map(|f| f.tags.clone())
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.borrow().contains_key(path.as_ref())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    pub fn copies(&self) -> Vec<(PathBuf, PathBuf)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Copy { from, to } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub fn moves(&self) -> Vec<(PathBuf, PathBuf)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Move { from, to } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    /// Copies and moves only, in order
    pub fn transfers(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| matches!(op, Op::Copy { .. } | Op::Move { .. }))
            .collect()
    }

    pub fn fail_on(&self, kind: FailOn, path: impl AsRef<Path>) {
        self.failures
            .borrow_mut()
            .push((kind, path.as_ref().to_path_buf()));
    }

    fn check(&self, kind: FailOn, paths: &[&Path]) -> StorageResult<()> {
        let failures = self.failures.borrow();
        for (fail_kind, fail_path) in failures.iter() {
            if *fail_kind == kind && paths.iter().any(|p| *p == fail_path.as_path()) {
                return Err(StorageError::Io {
                    path: fail_path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "injected failure"),
                });
            }
        }
        Ok(())
    }

    fn file(&self, path: &Path) -> StorageResult<MemoryFile> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &Path) -> bool {
        self.contains(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .borrow()
            .keys()
            .any(|k| k.as_path() != path && k.starts_with(path))
    }

    fn list_dir(&self, dir: &Path) -> StorageResult<Vec<String>> {
        if !self.is_dir(dir) {
            return Err(StorageError::NotFound(dir.to_path_buf()));
        }
        let mut names: Vec<String> = self
            .files
            .borrow()
            .keys()
            .filter(|k| k.parent() == Some(dir))
            .filter_map(|k| k.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    fn walk(&self, root: &Path) -> StorageResult<Vec<PathBuf>> {
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|k| k.as_path() != root && k.starts_with(root))
            .cloned()
            .collect())
    }

    fn copy(&self, from: &Path, to: &Path) -> StorageResult<()> {
        self.check(FailOn::Copy, &[from, to])?;
        let mut file = self.file(from)?;
        file.modified = SystemTime::now();
        self.files.borrow_mut().insert(to.to_path_buf(), file);
        self.ops.borrow_mut().push(Op::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        Ok(())
    }

    fn move_file(&self, from: &Path, to: &Path) -> StorageResult<()> {
        self.check(FailOn::Move, &[from, to])?;
        let file = self.file(from)?;
        let mut files = self.files.borrow_mut();
        files.remove(from);
        files.insert(to.to_path_buf(), file);
        self.ops.borrow_mut().push(Op::Move {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        Ok(())
    }

    fn remove(&self, path: &Path) -> StorageResult<()> {
        self.file(path)?;
        self.files.borrow_mut().remove(path);
        self.ops.borrow_mut().push(Op::Remove(path.to_path_buf()));
        Ok(())
    }

    fn read_tags(&self, path: &Path) -> StorageResult<StoredTags> {
        self.check(FailOn::ReadTags, &[path])?;
        Ok(self.file(path)?.tags)
    }

    fn write_tags(&self, path: &Path, values: &TagValues) -> StorageResult<()> {
        self.check(FailOn::WriteTags, &[path])?;
        let mut files = self.files.borrow_mut();
        let file = files
            .get_mut(path)
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))?;
        file.tags.apply(values);
        self.ops.borrow_mut().push(Op::WriteTags {
            path: path.to_path_buf(),
            values: values.clone(),
        });
        Ok(())
    }

    fn read_text(&self, path: &Path) -> StorageResult<String> {
        Ok(self.file(path)?.text)
    }

    fn modified(&self, path: &Path) -> StorageResult<SystemTime> {
        Ok(self.file(path)?.modified)
    }
}
