//! End-to-end runs: directory scan followed by the orchestrator, on the
//! in-memory storage

mod helpers;

use helpers::*;
use rbtag::models::RunSummary;
use rbtag::services::{scanner, Orchestrator};
use rbtag::RunContext;
use rbtag_common::config::Settings;

const NEWER: &str = "emissions/Matinale-20240103-01-A.mp3";
const OLDER: &str = "emissions/Matinale-20240102-01-B.mp3";
const JOURNAL: &str = "emissions/Journal-20240101-01-Flash.mp3";

fn run(settings: &Settings, storage: &MemoryStorage) -> RunSummary {
    let programs = programs();
    let ctx = RunContext::new(settings, storage, &programs);

    let outcome = scanner::scan(&ctx).unwrap();
    let mut summary = RunSummary {
        candidates: outcome.candidates.len(),
        warnings: outcome.warnings,
        ..RunSummary::default()
    };
    Orchestrator::new(&ctx).run(&outcome.candidates, &mut summary);
    summary
}

#[test]
fn test_alias_file_end_to_end() {
    let settings = settings(&format!("{}\nauto_correct_filename = true", LOCAL_ONLY));
    let programs = programs();
    let storage = MemoryStorage::new();
    storage.add_audio(local("morningshow-20240301-03-Episode Title.mp3"), untagged(2712.4));

    let ctx = RunContext::new(&settings, &storage, &programs);
    let outcome = scanner::scan(&ctx).unwrap();
    assert_eq!(outcome.candidates.len(), 1);

    let identity = &outcome.candidates[0];
    assert_eq!(identity.artist, "Matinale");
    assert!(identity.requires_history);
    assert_eq!(identity.date, "20240301");
    assert_eq!(identity.track, "03");
    assert_eq!(identity.raw_title, "Episode Title");

    let mut summary = RunSummary::default();
    Orchestrator::new(&ctx).run(&outcome.candidates, &mut summary);
    assert_eq!(summary.changes, 1);
    assert_eq!(summary.errors, 0);

    let renamed = local("Matinale#20240301#03#Episode Title.mp3");
    let source_tags = storage.tags(&renamed).unwrap();
    assert_eq!(source_tags.artist, "Matinale");
    assert_eq!(source_tags.title, "20240301-03-(45:12)-Episode Title");
    assert_eq!(
        storage.tags(local("current/Matinale#current.mp3")).unwrap().title,
        "C#-20240301-03-(45:12)-Episode Title"
    );
    assert!(!storage.contains(local("morningshow-20240301-03-Episode Title.mp3")));
}

#[test]
fn test_newest_first_fills_current_then_previous() {
    let settings = settings(LOCAL_ONLY);
    let storage = MemoryStorage::new();
    storage.add_audio(local(OLDER), untagged(1800.0));
    storage.add_audio(local(NEWER), untagged(1800.0));

    let summary = run(&settings, &storage);

    assert_eq!(
        summary,
        RunSummary {
            candidates: 2,
            processed: 2,
            changes: 2,
            // Both filenames use `-` instead of the `#` separator
            warnings: 2,
            errors: 0,
            limit_reached: false,
        }
    );
    assert_eq!(
        storage.tags(local("current/Matinale#current.mp3")).unwrap().title,
        "C#-20240103-01-(30:00)-A"
    );
    assert_eq!(
        storage.tags(local("current/Matinale#previous.mp3")).unwrap().title,
        "P#-20240102-01-(30:00)-B"
    );
}

#[test]
fn test_change_limit_stops_between_files() {
    let settings = settings(&format!("{}\nchange_limit = 1", LOCAL_ONLY));
    let storage = MemoryStorage::new();
    storage.add_audio(local(OLDER), untagged(1800.0));
    storage.add_audio(local(NEWER), untagged(1800.0));

    let summary = run(&settings, &storage);

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.changes, 1);
    assert!(summary.limit_reached);
    assert!(!storage.contains(local("current/Matinale#previous.mp3")));
}

#[test]
fn test_recoverable_error_is_isolated() {
    let settings = settings(LOCAL_ONLY);
    let storage = MemoryStorage::new();
    storage.add_audio(local(NEWER), untagged(1800.0));
    storage.add_audio(local(JOURNAL), untagged(60.0));
    storage.fail_on(FailOn::Copy, local("current/Matinale#current.mp3"));

    let summary = run(&settings, &storage);

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.errors, 1);
    // Only the Journal file counts as changed
    assert_eq!(summary.changes, 1);
    assert_eq!(storage.tags(local(JOURNAL)).unwrap().artist, "Journal");
}

#[test]
fn test_unexpected_error_counts_as_change() {
    let settings = settings(LOCAL_ONLY);
    let storage = MemoryStorage::new();
    storage.add_audio(local(NEWER), untagged(1800.0));
    storage.add_audio(local(JOURNAL), untagged(60.0));
    storage.fail_on(FailOn::ReadTags, local(NEWER));

    let summary = run(&settings, &storage);

    assert_eq!(summary.errors, 1);
    assert_eq!(summary.changes, 2);
    assert_eq!(storage.tags(local(JOURNAL)).unwrap().artist, "Journal");
}

#[test]
fn test_missing_distant_copy_skips_file() {
    let settings = settings(REPLICATED);
    let storage = MemoryStorage::new();
    storage.add_audio(local(JOURNAL), untagged(60.0));

    let summary = run(&settings, &storage);

    assert_eq!(summary.errors, 1);
    assert_eq!(summary.changes, 0);
    assert!(storage.ops().is_empty());
}

#[test]
fn test_second_run_is_a_no_op() {
    let settings = settings_with(
        &format!("{}\nauto_correct_filename = true", LOCAL_ONLY),
        "filename_separator = \"-\"",
        DIRECTORY_SCAN,
    );
    let storage = MemoryStorage::new();
    storage.add_audio(local(OLDER), untagged(1800.0));
    storage.add_audio(local(NEWER), untagged(1800.0));
    storage.add_audio(local(JOURNAL), untagged(60.0));

    let first = run(&settings, &storage);
    assert_eq!(first.changes, 3);
    assert_eq!(first.warnings, 0);

    storage.clear_ops();
    let second = run(&settings, &storage);
    assert_eq!(second.processed, 3);
    assert_eq!(second.changes, 0);
    assert_eq!(second.errors, 0);
    assert!(storage.ops().is_empty());
}

#[test]
fn test_dry_run_plans_every_candidate() {
    let settings = settings(&format!("{}\nchange_limit = 1", DRY_RUN));
    let storage = MemoryStorage::new();
    for file in [NEWER, OLDER] {
        storage.add_audio(local(file), untagged(1800.0));
        storage.add_audio(distant(file), untagged(1800.0));
    }

    let summary = run(&settings, &storage);

    assert_eq!(
        summary,
        RunSummary {
            candidates: 2,
            processed: 2,
            changes: 0,
            warnings: 2,
            errors: 0,
            limit_reached: false,
        }
    );
    assert!(storage.ops().is_empty());
    assert_eq!(storage.tags(local(NEWER)).unwrap().title, "");
}
