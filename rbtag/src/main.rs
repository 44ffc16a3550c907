//! rbtag - radio episode archive tagger
//!
//! One run: load the configuration and the program roster, discover
//! candidate files (directory walk or latest diff-log), bring each file's
//! tags, name and current/previous copies up to date, prune old logs and
//! report a summary. Exits non-zero when any file failed.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::Parser;
use rbtag::models::RunSummary;
use rbtag::services::{scanner, Orchestrator, ProgramDirectory, RetentionPolicy};
use rbtag::storage::{LocalStorage, Storage};
use rbtag::RunContext;
use rbtag_common::config::{resolve_config_path, LoggingConfig, Overrides, Settings};
use regex::Regex;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for rbtag
#[derive(Parser, Debug)]
#[command(name = "rbtag")]
#[command(about = "Tag, rename and version radio episode recordings")]
#[command(version)]
struct Args {
    /// Configuration file (default: $RBTAG_CONFIG, then the user config folder)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Walk the local root instead of reading the latest diff-log
    #[arg(long)]
    scan_directory: Option<bool>,

    /// Stop after this many changed files (0 = unlimited)
    #[arg(long)]
    change_limit: Option<usize>,

    /// Keep only filenames containing one of these comma-separated terms
    #[arg(long, value_delimiter = ',')]
    scan_audio_filter: Option<Vec<String>>,

    /// Keep only paths containing one of these comma-separated terms
    #[arg(long, value_delimiter = ',')]
    scan_path_filter: Option<Vec<String>>,

    /// Dry-run: log every change instead of applying it
    #[arg(long)]
    no_action: Option<bool>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            scan_directory: self.scan_directory,
            change_limit: self.change_limit,
            audio_filter: self.scan_audio_filter.clone(),
            path_filter: self.scan_path_filter.clone(),
            no_action: self.no_action,
        }
    }
}

/// Install the stderr layer and, when a log directory is configured, a
/// per-run log file. Returns the log file path.
fn init_logging(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, log_path) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = dir.join(format!(
                "{}_{}.log",
                config.mask,
                chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
            ));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(log_path)
}

/// Prune old run logs and diff-logs
fn apply_retention(settings: &Settings, storage: &dyn Storage) {
    let logging = &settings.logging;
    if !logging.rotation {
        return;
    }
    let policy = RetentionPolicy::new(logging.retention_days, settings.no_action);
    let now = SystemTime::now();

    let mut targets = Vec::new();
    if let Some(dir) = &logging.directory {
        match Regex::new(&format!("^{}_", regex::escape(&logging.mask))) {
            Ok(pattern) => targets.push((dir.clone(), pattern)),
            Err(e) => warn!("Invalid log mask {:?}: {}", logging.mask, e),
        }
    }
    if let Some(diff_log) = &settings.diff_log {
        if storage.is_dir(&diff_log.path) {
            targets.push((diff_log.path.clone(), diff_log.signature.clone()));
        }
    }

    for (dir, pattern) in targets {
        match policy.prune(storage, &dir, &pattern, now) {
            Ok(count) => info!(dir = %dir.display(), count, "Retention applied"),
            Err(e) => warn!(dir = %dir.display(), "Retention failed: {}", e),
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref())?;
    let settings = Settings::load(&config_path, &args.overrides())
        .with_context(|| format!("Failed to load configuration {}", config_path.display()))?;

    let log_path = init_logging(&settings.logging)?;

    info!("Starting rbtag (Radio episode archive tagger)");
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration: {}", config_path.display());
    if let Some(path) = &log_path {
        info!("Log file: {}", path.display());
    }
    if settings.no_action {
        warn!("Dry-run mode: no file will be modified");
    }

    let storage = LocalStorage::new();
    let programs = ProgramDirectory::load(&storage, &settings.roster_file)
        .context("Failed to load program roster")?;
    let ctx = RunContext::new(&settings, &storage, &programs);

    let mut summary = RunSummary::default();
    match scanner::scan(&ctx) {
        Ok(outcome) => {
            summary.candidates = outcome.candidates.len();
            summary.warnings += outcome.warnings;
            Orchestrator::new(&ctx).run(&outcome.candidates, &mut summary);
        }
        Err(e) => {
            error!("Scan failed: {}", e);
            summary.errors += 1;
        }
    }

    apply_retention(&settings, &storage);

    info!("Run complete: {}", summary);
    println!("{}", summary);

    Ok(if summary.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
