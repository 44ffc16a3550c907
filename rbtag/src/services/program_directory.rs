//! Program roster: canonical names and aliases
//!
//! Roster lines read `name,historyFlag[,alias]*`. Lines starting with `#`
//! or with fewer than two fields are ignored. Every name is indexed by its
//! normalized key; an alias never replaces a key already present.

use crate::models::CanonicalProgram;
use crate::storage::Storage;
use rbtag_common::{normalize_name, Error, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

/// Lookup table from normalized names and aliases to programs
#[derive(Debug, Clone, Default)]
pub struct ProgramDirectory {
    entries: HashMap<String, CanonicalProgram>,
}

impl ProgramDirectory {
    /// Read the roster file through the storage backend
    pub fn load(storage: &dyn Storage, path: &Path) -> Result<Self> {
        let content = storage.read_text(path).map_err(|e| Error::RosterRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let directory = Self::parse(&content, path)?;
        tracing::info!(roster = %path.display(), keys = directory.len(), "Program roster loaded");
        Ok(directory)
    }

    /// Build the table from roster text; `path` is only used in errors
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut directory = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 2 {
                continue;
            }

            let requires_history = match fields[1] {
                "0" => false,
                "1" => true,
                other => {
                    return Err(Error::RosterRead {
                        path: path.to_path_buf(),
                        reason: format!(
                            "line {}: history flag must be 0 or 1, found {:?}",
                            index + 1,
                            other
                        ),
                    })
                }
            };

            let program = CanonicalProgram {
                name: fields[0].to_string(),
                requires_history,
            };
            directory.insert_canonical(&program);
            for alias in &fields[2..] {
                directory.insert_alias(alias, &program);
            }
        }

        Ok(directory)
    }

    fn insert_canonical(&mut self, program: &CanonicalProgram) {
        let key = normalize_name(&program.name);
        if key.is_empty() {
            tracing::warn!(name = %program.name, "Program name has no alphanumeric character, skipped");
            return;
        }
        if let Some(previous) = self.entries.insert(key.clone(), program.clone()) {
            tracing::warn!(key = %key, previous = %previous.name, program = %program.name, "Roster key redefined");
        }
    }

    fn insert_alias(&mut self, alias: &str, program: &CanonicalProgram) {
        let key = normalize_name(alias);
        if key.is_empty() {
            return;
        }
        match self.entries.entry(key) {
            Entry::Occupied(existing) => {
                tracing::debug!(
                    alias = %alias,
                    key = %existing.key(),
                    owner = %existing.get().name,
                    "Duplicate alias ignored"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(program.clone());
            }
        }
    }

    /// Program for a raw name or alias
    pub fn resolve(&self, raw_name: &str) -> Option<&CanonicalProgram> {
        self.entries.get(&normalize_name(raw_name))
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
