//! Commit protocol tests
//!
//! Verifies that at every step boundary either the old or the new content is
//! intact on disk, and that a commit interrupted mid-way leaves a byte-exact
//! backup behind.

use std::fs;
use std::path::{Path, PathBuf};
use inied_core::backup::{find_backups, restore_latest};
use inied_core::{AtomicWriter, ConfigStore, EditError};
use tempfile::TempDir;

const ORIGINAL: &str = "# hand written\n[net]\nhost=localhost   ; default\n\n[db]\nport: 5432\n";

fn create_config(dir: &Path) -> PathBuf {
    let path = dir.join("a.ini");
    fs::write(&path, ORIGINAL).expect("Failed to write config");
    path
}

fn modified_store(path: &Path) -> ConfigStore {
    let mut store = ConfigStore::load(path).expect("Failed to load config");
    store
        .set_item("net", "host", "127.0.0.1", false)
        .expect("Failed to set item");
    store
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Full commit
// =============================================================================

#[test]
fn test_commit_replaces_content_and_cleans_up() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_config(temp_dir.path());
    let store = modified_store(&path);

    let outcome = AtomicWriter::new()
        .commit(&path, &store)
        .expect("Commit failed");

    assert_eq!(outcome.path, path);
    assert!(outcome.leftover_backup.is_none());
    assert!(!outcome.temp_path.exists());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[net]\nhost = 127.0.0.1\n\n[db]\nport = 5432\n\n"
    );
    assert_eq!(dir_entries(temp_dir.path()), vec!["a.ini"]);
}

#[test]
fn test_commit_preserves_unrelated_backup() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_config(temp_dir.path());
    let old_backup = temp_dir.path().join("a.ini.bak");
    fs::write(&old_backup, "precious").unwrap();

    let store = modified_store(&path);
    AtomicWriter::new()
        .commit(&path, &store)
        .expect("Commit failed");

    assert_eq!(fs::read_to_string(&old_backup).unwrap(), "precious");
    assert_eq!(dir_entries(temp_dir.path()), vec!["a.ini", "a.ini.bak"]);
}

#[test]
fn test_staged_backup_avoids_existing_backup() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_config(temp_dir.path());
    fs::write(temp_dir.path().join("a.ini.bak"), "precious").unwrap();

    let staged = AtomicWriter::new()
        .stage(&path, b"[x]\n")
        .expect("Stage failed");
    let backup = staged.backup_path().expect("Expected a backup path");
    let name = backup.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("a.ini.bak-"), "unexpected backup name {name}");
}

// =============================================================================
// Interrupted commits
// =============================================================================

#[test]
fn test_abort_after_retire_keeps_exact_original_in_backup() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_config(temp_dir.path());
    let store = modified_store(&path);

    let retired = AtomicWriter::new()
        .stage(&path, store.to_ini_string().as_bytes())
        .expect("Stage failed")
        .retire_original()
        .expect("Retire failed");
    let backup = retired.backup_path().expect("Expected a backup").to_path_buf();
    let temp = retired.temp_path().to_path_buf();

    // Simulated crash between step 4 and step 5
    drop(retired);

    assert!(!path.exists());
    assert!(!temp.exists());
    assert_eq!(fs::read(&backup).unwrap(), ORIGINAL.as_bytes());
}

#[test]
fn test_interrupted_commit_can_be_recovered() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_config(temp_dir.path());

    let retired = AtomicWriter::new()
        .stage(&path, b"[new]\n")
        .unwrap()
        .retire_original()
        .unwrap();
    drop(retired);

    assert_eq!(find_backups(&path).unwrap().len(), 1);
    restore_latest(&path, false).expect("Restore failed");

    assert_eq!(fs::read_to_string(&path).unwrap(), ORIGINAL);
    assert!(find_backups(&path).unwrap().is_empty());
}

#[test]
fn test_abort_before_retire_changes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_config(temp_dir.path());

    let staged = AtomicWriter::new().stage(&path, b"[new]\n").unwrap();
    drop(staged);

    assert_eq!(fs::read_to_string(&path).unwrap(), ORIGINAL);
    assert_eq!(dir_entries(temp_dir.path()), vec!["a.ini"]);
}

#[test]
fn test_install_failure_reports_recovery_needed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_config(temp_dir.path());

    let retired = AtomicWriter::new()
        .stage(&path, b"[new]\n")
        .unwrap()
        .retire_original()
        .unwrap();
    let backup = retired.backup_path().unwrap().to_path_buf();

    // A directory squatting on the target path makes the final rename fail
    fs::create_dir(&path).unwrap();
    fs::write(path.join("blocker"), "x").unwrap();

    match retired.install() {
        Err(EditError::RecoveryNeeded {
            path: failed,
            backup: kept,
            ..
        }) => {
            assert_eq!(failed, path);
            assert_eq!(kept, backup);
        }
        other => panic!("Expected RecoveryNeeded, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&backup).unwrap(), ORIGINAL);
}

#[test]
fn test_cleanup_failure_still_commits() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_config(temp_dir.path());

    let retired = AtomicWriter::new()
        .stage(&path, b"[new]\n")
        .unwrap()
        .retire_original()
        .unwrap();
    let backup = retired.backup_path().unwrap().to_path_buf();

    // Swap the backup for a non-empty directory that remove_file cannot delete
    fs::rename(&backup, temp_dir.path().join("moved-aside")).unwrap();
    fs::create_dir(&backup).unwrap();
    fs::write(backup.join("blocker"), "x").unwrap();

    let outcome = retired.install().expect("Install failed").cleanup();

    assert_eq!(fs::read_to_string(&path).unwrap(), "[new]\n");
    assert_eq!(outcome.leftover_backup, Some(backup.clone()));
    assert!(backup.is_dir());
}

// =============================================================================
// Staging failures
// =============================================================================

#[test]
fn test_stage_in_missing_directory_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("missing").join("a.ini");

    let err = AtomicWriter::new().stage(&path, b"[a]\n").unwrap_err();
    assert!(matches!(err, EditError::Io { .. }), "got {err:?}");
}
