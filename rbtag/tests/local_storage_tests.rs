//! Local storage backend on real files
//!
//! WAV fixtures are generated with hound; tags are ID3v2 frames stored in
//! the WAV `id3 ` chunk.

mod helpers;

use helpers::generate_test_wav;
use rbtag::models::TagValues;
use rbtag::storage::{LocalStorage, Storage, StorageError};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

#[test]
fn test_wav_tags_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Matinale-20240101-01-A.wav");
    generate_test_wav(&path, 2.0).unwrap();
    let storage = LocalStorage::new();

    let before = storage.read_tags(&path).unwrap();
    assert_eq!(before.title, "");
    assert_eq!(before.artist, "");
    assert!((before.duration_seconds - 2.0).abs() < 0.05);

    let values = TagValues {
        artist: "Matinale".to_string(),
        date: "20240101".to_string(),
        track: "01".to_string(),
        title: "20240101-01-(00:02)-A".to_string(),
    };
    storage.write_tags(&path, &values).unwrap();

    let after = storage.read_tags(&path).unwrap();
    assert_eq!(after.artist, values.artist);
    assert_eq!(after.date, values.date);
    assert_eq!(after.track, values.track);
    assert_eq!(after.title, values.title);
    assert!((after.duration_seconds - 2.0).abs() < 0.05);
}

#[test]
fn test_copy_then_retag_leaves_original() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("A.wav");
    let copy = temp.path().join("current").join("Matinale#current.wav");
    generate_test_wav(&source, 1.0).unwrap();
    let storage = LocalStorage::new();

    storage.copy(&source, &copy).unwrap();
    storage
        .write_tags(
            &copy,
            &TagValues {
                artist: "Matinale".to_string(),
                title: "C#-A".to_string(),
                ..TagValues::default()
            },
        )
        .unwrap();

    assert_eq!(storage.read_tags(&copy).unwrap().title, "C#-A");
    assert_eq!(storage.read_tags(&source).unwrap().title, "");
}

#[test]
fn test_walk_lists_nested_files_in_name_order() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("b")).unwrap();
    std::fs::write(temp.path().join("b").join("2.mp3"), "").unwrap();
    std::fs::write(temp.path().join("a.mp3"), "").unwrap();

    let files = LocalStorage::new().walk(temp.path()).unwrap();
    assert_eq!(
        files,
        vec![temp.path().join("a.mp3"), temp.path().join("b").join("2.mp3")]
    );
}

#[test]
fn test_walk_missing_root() {
    let temp = TempDir::new().unwrap();
    let err = LocalStorage::new().walk(&temp.path().join("absent")).unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[test]
fn test_unsupported_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("show.ogg");
    std::fs::write(&path, "not audio").unwrap();

    let err = LocalStorage::new().read_tags(&path).unwrap_err();
    assert!(matches!(err, StorageError::Unsupported(_)));
}

#[test]
fn test_modified_is_recent() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rbtag_2024-01-01_00-00-00.log");
    std::fs::write(&path, "").unwrap();

    let modified = LocalStorage::new().modified(&path).unwrap();
    let age = SystemTime::now().duration_since(modified).unwrap_or_default();
    assert!(age < Duration::from_secs(60));
}
