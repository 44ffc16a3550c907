//! Test Helper Utilities
//!
//! Shared fixtures for the rbtag integration tests: configuration builders,
//! an in-memory storage backend and a WAV generator.

#![allow(dead_code)]

pub mod audio_generator;
pub mod memory_storage;

#[allow(unused_imports)]
pub use audio_generator::generate_test_wav;
#[allow(unused_imports)]
pub use memory_storage::{FailOn, MemoryStorage, Op};

use rbtag::models::{FileIdentity, StoredTags};
use rbtag::services::{FilenameParser, ProgramDirectory};
use rbtag_common::config::{Overrides, Settings};
use std::path::{Path, PathBuf};

pub const LOCAL_ROOT: &str = "/local/";
pub const DISTANT_ROOT: &str = "/distant/";
pub const ROSTER_PATH: &str = "/config/programs.txt";
pub const ROSTER: &str = "# name,history,aliases\nMatinale,1,Morning Show\nJournal,0\n";
pub const SIGNATURE: &str = r"(.+?)-(\d{8})-(\d{2})-(.*)\.(mp3)$";

/// Local changes only
pub const LOCAL_ONLY: &str = "no_action = false\nmake_distant_copy = false";
/// Local changes mirrored to the distant root
pub const REPLICATED: &str = "no_action = false\nmake_distant_copy = true";
/// Dry-run with replication
pub const DRY_RUN: &str = "no_action = true\nmake_distant_copy = true";

pub const DIRECTORY_SCAN: &str = "[scan_dir]\nenabled = true";

/// Build settings from `[general]` lines, extra `[audio]` lines and the
/// scan sections
pub fn settings_with(general: &str, audio: &str, scan: &str) -> Settings {
    let content = format!(
        "[general]\nroster_file = \"{}\"\n{}\n\n[audio]\nlocal_root = \"{}\"\ndistant_root = \"{}\"\naudio_signature = '{}'\n{}\n\n{}\n",
        ROSTER_PATH, general, LOCAL_ROOT, DISTANT_ROOT, SIGNATURE, audio, scan
    );
    Settings::from_toml_str(&content, &Overrides::default()).expect("valid test configuration")
}

/// Directory-scan settings with default `[audio]` options
pub fn settings(general: &str) -> Settings {
    settings_with(general, "", DIRECTORY_SCAN)
}

pub fn programs() -> ProgramDirectory {
    ProgramDirectory::parse(ROSTER, Path::new(ROSTER_PATH)).expect("valid test roster")
}

pub fn identity(
    settings: &Settings,
    programs: &ProgramDirectory,
    relative_path: &str,
    filename: &str,
) -> FileIdentity {
    FilenameParser::new(&settings.audio_signature, &settings.allowed_extensions, programs)
        .parse(relative_path, filename)
        .expect("parsable test filename")
}

pub fn tags(artist: &str, date: &str, track: &str, title: &str, duration_seconds: f64) -> StoredTags {
    StoredTags {
        artist: artist.to_string(),
        date: date.to_string(),
        track: track.to_string(),
        title: title.to_string(),
        duration_seconds,
    }
}

/// Tags without any text frame
pub fn untagged(duration_seconds: f64) -> StoredTags {
    tags("", "", "", "", duration_seconds)
}

pub fn local(relative: &str) -> PathBuf {
    Path::new(LOCAL_ROOT).join(relative)
}

pub fn distant(relative: &str) -> PathBuf {
    Path::new(DISTANT_ROOT).join(relative)
}
