//! Configuration loading and validation
//!
//! Two stages:
//! 1. **TOML**: [`TomlConfig`] mirrors the file layout, every optional field
//!    carries an explicit default.
//! 2. **Validation**: [`Settings::build`] applies command-line [`Overrides`],
//!    compiles every regex (case-insensitive) and resolves the scan mode.
//!    Any failure here is fatal, nothing has been touched yet.
//!
//! # Config file resolution
//!
//! 1. `--config` command-line argument (highest priority)
//! 2. `RBTAG_CONFIG` environment variable
//! 3. `<user config dir>/rbtag/rbtag.toml`

use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "RBTAG_CONFIG";

/// Number of capture groups the audio filename signature must define:
/// artist, date, track, raw title, extension.
pub const AUDIO_SIGNATURE_GROUPS: usize = 5;

/// Raw configuration as read from the TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub general: GeneralSection,
    pub audio: AudioSection,
    #[serde(default)]
    pub scan_dir: ScanDirSection,
    #[serde(default)]
    pub scan_file: ScanFileSection,
    #[serde(default)]
    pub log: LoggingConfig,
}

/// `[general]` section
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralSection {
    /// Program roster file (`name,historyFlag[,alias]*` per line)
    pub roster_file: PathBuf,

    /// Dry-run: log every mutation instead of performing it
    #[serde(default = "default_true")]
    pub no_action: bool,

    /// Mirror every change to the distant root
    #[serde(default = "default_true")]
    pub make_distant_copy: bool,

    /// Rename misnamed source files instead of only warning
    #[serde(default)]
    pub auto_correct_filename: bool,

    /// Case-insensitive substrings excluding a file from every scan
    #[serde(default)]
    pub excluded_paths: Vec<String>,

    /// Stop after this many changed files (0 = unlimited)
    #[serde(default)]
    pub change_limit: usize,
}

/// `[audio]` section
#[derive(Debug, Clone, Deserialize)]
pub struct AudioSection {
    pub local_root: PathBuf,

    /// Required when `make_distant_copy` is enabled
    #[serde(default)]
    pub distant_root: Option<PathBuf>,

    /// Root-relative folder holding the current/previous files
    #[serde(default = "default_current_path")]
    pub current_path: PathBuf,

    /// Filename regex with five groups: artist, date, track, title, extension
    pub audio_signature: String,

    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Separator used when building canonical filenames
    #[serde(default = "default_filename_separator")]
    pub filename_separator: String,
}

/// `[scan_dir]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanDirSection {
    /// Walk the whole local root instead of reading the latest diff-log
    #[serde(default)]
    pub enabled: bool,

    /// Keep only paths containing one of these terms
    #[serde(default)]
    pub path_filter: Vec<String>,

    /// Keep only filenames containing one of these terms
    #[serde(default)]
    pub audio_filter: Vec<String>,
}

/// `[scan_file]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanFileSection {
    /// Diff-log file, or directory holding timestamped diff-logs
    #[serde(default)]
    pub sync_path: Option<PathBuf>,

    /// Regex selecting diff-log names inside `sync_path`
    #[serde(default)]
    pub sync_signature: Option<String>,

    /// Multi-line templates; the last line's second group is the file path
    #[serde(default)]
    pub templates: Vec<Vec<String>>,
}

/// `[log]` section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for per-run log files (stderr only if not specified)
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Log file name prefix
    #[serde(default = "default_log_mask")]
    pub mask: String,

    /// Prune old log files and diff-logs at the end of a run
    #[serde(default = "default_true")]
    pub rotation: bool,

    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            mask: default_log_mask(),
            rotation: true,
            retention_days: default_retention_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_current_path() -> PathBuf {
    PathBuf::from("current/")
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

fn default_filename_separator() -> String {
    "#".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_mask() -> String {
    "rbtag".to_string()
}

fn default_retention_days() -> u32 {
    30
}

/// Command-line overrides, applied on top of the TOML values
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub scan_directory: Option<bool>,
    pub change_limit: Option<usize>,
    pub audio_filter: Option<Vec<String>>,
    pub path_filter: Option<Vec<String>>,
    pub no_action: Option<bool>,
}

/// Local and distant storage roots
#[derive(Debug, Clone)]
pub struct Roots {
    pub local: PathBuf,
    pub distant: Option<PathBuf>,
}

/// One multi-line diff-log template, each line a compiled pattern
#[derive(Debug, Clone)]
pub struct LineTemplate {
    lines: Vec<Regex>,
}

impl LineTemplate {
    /// Build a template; `lines` must not be empty
    pub fn new(lines: Vec<Regex>) -> Result<Self> {
        if lines.is_empty() {
            return Err(Error::Config("Diff-log template has no lines".to_string()));
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[Regex] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Where diff-logs live
#[derive(Debug, Clone)]
pub struct DiffLogSource {
    pub path: PathBuf,
    pub signature: Regex,
}

/// Candidate discovery strategy
#[derive(Debug, Clone)]
pub enum ScanMode {
    /// Walk the local root
    Directory {
        path_filter: Vec<String>,
        audio_filter: Vec<String>,
    },
    /// Read the latest diff-log through the templates
    Log { templates: Vec<LineTemplate> },
}

/// Validated settings, assembled once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub roster_file: PathBuf,
    pub roots: Roots,
    pub no_action: bool,
    pub make_distant_copy: bool,
    pub auto_correct_filename: bool,
    /// Lowercased, empty terms dropped
    pub excluded_paths: Vec<String>,
    pub change_limit: usize,
    pub current_path: PathBuf,
    pub audio_signature: Regex,
    /// Lowercased
    pub allowed_extensions: Vec<String>,
    pub filename_separator: String,
    pub diff_log: Option<DiffLogSource>,
    pub scan: ScanMode,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Read, parse and validate a configuration file
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content, overrides)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str, overrides: &Overrides) -> Result<Self> {
        let raw: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        Self::build(raw, overrides)
    }

    /// Validate raw configuration and apply overrides
    pub fn build(raw: TomlConfig, overrides: &Overrides) -> Result<Self> {
        let TomlConfig {
            general,
            audio,
            scan_dir,
            scan_file,
            log,
        } = raw;

        let no_action = overrides.no_action.unwrap_or(general.no_action);
        let change_limit = overrides.change_limit.unwrap_or(general.change_limit);

        if general.make_distant_copy && audio.distant_root.is_none() {
            return Err(Error::Config(
                "audio.distant_root is required when general.make_distant_copy is enabled"
                    .to_string(),
            ));
        }

        let audio_signature = compile(&audio.audio_signature, "audio.audio_signature")?;
        let groups = audio_signature.captures_len() - 1;
        if groups != AUDIO_SIGNATURE_GROUPS {
            return Err(Error::Config(format!(
                "audio.audio_signature must define {} capture groups (artist, date, track, title, extension), found {}",
                AUDIO_SIGNATURE_GROUPS, groups
            )));
        }

        if audio.filename_separator.is_empty() {
            return Err(Error::Config("audio.filename_separator must not be empty".to_string()));
        }

        let diff_log = match (scan_file.sync_path, scan_file.sync_signature) {
            (Some(path), Some(signature)) => Some(DiffLogSource {
                path,
                signature: compile(&signature, "scan_file.sync_signature")?,
            }),
            (Some(_), None) => {
                return Err(Error::Config(
                    "scan_file.sync_signature is required with scan_file.sync_path".to_string(),
                ))
            }
            (None, _) => None,
        };

        let scan_directory = overrides.scan_directory.unwrap_or(scan_dir.enabled);
        let scan = if scan_directory {
            ScanMode::Directory {
                path_filter: filter_terms(
                    overrides.path_filter.as_ref().unwrap_or(&scan_dir.path_filter),
                ),
                audio_filter: filter_terms(
                    overrides.audio_filter.as_ref().unwrap_or(&scan_dir.audio_filter),
                ),
            }
        } else {
            if diff_log.is_none() {
                return Err(Error::Config(
                    "scan_file.sync_path is required unless scan_dir.enabled is set".to_string(),
                ));
            }
            ScanMode::Log {
                templates: compile_templates(&scan_file.templates)?,
            }
        };

        Ok(Self {
            roster_file: general.roster_file,
            roots: Roots {
                local: audio.local_root,
                distant: audio.distant_root,
            },
            no_action,
            make_distant_copy: general.make_distant_copy,
            auto_correct_filename: general.auto_correct_filename,
            excluded_paths: filter_terms(&general.excluded_paths),
            change_limit,
            current_path: audio.current_path,
            audio_signature,
            allowed_extensions: audio
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            filename_separator: audio.filename_separator,
            diff_log,
            scan,
            logging: log,
        })
    }

    /// Distant root, when replication is enabled
    pub fn replication_root(&self) -> Option<&Path> {
        if self.make_distant_copy {
            self.roots.distant.as_deref()
        } else {
            None
        }
    }
}

/// Resolve the configuration file path
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("rbtag").join("rbtag.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

fn compile(pattern: &str, option: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Config(format!("Invalid regex for {}: {}", option, e)))
}

fn compile_templates(raw: &[Vec<String>]) -> Result<Vec<LineTemplate>> {
    if raw.is_empty() {
        return Err(Error::Config(
            "scan_file.templates must define at least one template".to_string(),
        ));
    }

    raw.iter()
        .enumerate()
        .map(|(index, lines)| {
            let compiled = lines
                .iter()
                .map(|line| compile(line, &format!("scan_file.templates[{}]", index)))
                .collect::<Result<Vec<_>>>()?;
            let template = LineTemplate::new(compiled)?;
            let last = &template.lines()[template.len() - 1];
            if last.captures_len() - 1 < 2 {
                return Err(Error::Config(format!(
                    "Last line of scan_file.templates[{}] needs a second capture group for the file path",
                    index
                )));
            }
            Ok(template)
        })
        .collect()
}

/// Lowercase filter terms and drop empty ones
fn filter_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
