//! Program and file identities

/// A program from the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalProgram {
    /// Canonical program name, written as the artist tag
    pub name: String,
    /// Keep current/previous copies for this program
    pub requires_history: bool,
}

/// One candidate audio file, resolved against the roster
///
/// Created by a scanner, read-only afterwards (except the filename, which
/// follows a filename correction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    /// Canonical program name
    pub artist: String,
    /// Artist text as captured from the filename
    pub raw_artist: String,
    /// Normalized roster key the raw artist matched
    pub alias_key: String,
    pub date: String,
    pub track: String,
    pub raw_title: String,
    pub extension: String,
    /// Root-relative folder, `/`-separated with a trailing `/` (empty at the root)
    pub relative_path: String,
    pub filename: String,
    pub requires_history: bool,
    /// Lowercased filename with the raw artist replaced by its alias key
    pub sort_key: String,
}

impl FileIdentity {
    /// Root-relative path of the file
    pub fn relative_file(&self) -> String {
        format!("{}{}", self.relative_path, self.filename)
    }
}
