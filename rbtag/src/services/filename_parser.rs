//! Filename parsing
//!
//! The audio signature has five capture groups: artist, date, track, raw
//! title, extension. Parsing never fails: files that are not episode
//! recordings come back as a [`Rejection`].

use crate::models::FileIdentity;
use crate::services::program_directory::ProgramDirectory;
use rbtag_common::normalize_name;
use regex::Regex;
use std::fmt;

const GROUP_ARTIST: usize = 1;
const GROUP_DATE: usize = 2;
const GROUP_TRACK: usize = 3;
const GROUP_TITLE: usize = 4;
const GROUP_EXTENSION: usize = 5;

/// Why a file is not a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Path contains an excluded term
    Excluded,
    /// Path or filename misses every inclusion term
    FilteredOut,
    /// Filename does not match the audio signature
    UnmatchedFilename,
    DisallowedExtension(String),
    UnknownArtist(String),
    /// Diff-log path under neither root
    OutsideRoots,
}

impl Rejection {
    /// Rejections worth a warning in the run summary
    pub fn is_warning(&self) -> bool {
        matches!(self, Rejection::UnknownArtist(_))
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Excluded => write!(f, "excluded path"),
            Rejection::FilteredOut => write!(f, "filtered out"),
            Rejection::UnmatchedFilename => write!(f, "filename does not match the audio signature"),
            Rejection::DisallowedExtension(ext) => write!(f, "extension {:?} not allowed", ext),
            Rejection::UnknownArtist(artist) => write!(f, "unknown artist {:?}", artist),
            Rejection::OutsideRoots => write!(f, "path outside the storage roots"),
        }
    }
}

/// Turns a filename into a [`FileIdentity`]
pub struct FilenameParser<'a> {
    signature: &'a Regex,
    allowed_extensions: &'a [String],
    programs: &'a ProgramDirectory,
}

impl<'a> FilenameParser<'a> {
    /// `allowed_extensions` are expected lowercase, without the dot
    pub fn new(
        signature: &'a Regex,
        allowed_extensions: &'a [String],
        programs: &'a ProgramDirectory,
    ) -> Self {
        Self {
            signature,
            allowed_extensions,
            programs,
        }
    }

    pub fn parse(&self, relative_path: &str, filename: &str) -> Result<FileIdentity, Rejection> {
        let captures = match self.signature.captures(filename) {
            Some(captures) => captures,
            None => {
                tracing::debug!(file = %filename, "Filename does not match the audio signature");
                return Err(Rejection::UnmatchedFilename);
            }
        };
        let group = |index: usize| {
            captures
                .get(index)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        let extension = group(GROUP_EXTENSION);
        if !self
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        {
            tracing::debug!(file = %filename, extension = %extension, "Extension not allowed");
            return Err(Rejection::DisallowedExtension(extension));
        }

        let raw_artist = group(GROUP_ARTIST);
        let program = match self.programs.resolve(&raw_artist) {
            Some(program) => program,
            None => {
                tracing::warn!(file = %filename, artist = %raw_artist, "Unknown artist, file skipped");
                return Err(Rejection::UnknownArtist(raw_artist));
            }
        };

        let alias_key = normalize_name(&raw_artist);
        let sort_key = filename
            .to_lowercase()
            .replace(&raw_artist.to_lowercase(), &alias_key);

        Ok(FileIdentity {
            artist: program.name.clone(),
            raw_artist,
            alias_key,
            date: group(GROUP_DATE),
            track: group(GROUP_TRACK),
            raw_title: group(GROUP_TITLE),
            extension,
            relative_path: relative_path.to_string(),
            filename: filename.to_string(),
            requires_history: program.requires_history,
            sort_key,
        })
    }
}
