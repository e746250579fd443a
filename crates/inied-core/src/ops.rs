//! Edit operations
//!
//! One load → mutate → commit cycle per call. Requests are plain immutable
//! values built by the caller; nothing here reads global state.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backup;
use crate::commit::{AtomicWriter, CommitOutcome};
use crate::display;
use crate::error::{EditError, EditResult};
use crate::store::{ConfigStore, RemoveTarget, Removal};

/// Operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Set,
    Remove,
    Recover,
}

/// A read request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    pub section: Option<String>,
    pub item: Option<String>,
    /// List section names only
    pub sections_only: bool,
    /// List key names only within a section
    pub names_only: bool,
    /// Print only the value of one item
    pub value_only: bool,
    /// Print the `[section]` header before a section's items
    pub print_section: bool,
    pub separator: String,
    pub json: bool,
}

impl Default for GetRequest {
    fn default() -> Self {
        Self {
            section: None,
            item: None,
            sections_only: false,
            names_only: false,
            value_only: false,
            print_section: false,
            separator: display::DEFAULT_SEPARATOR.to_string(),
            json: false,
        }
    }
}

/// A write request for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRequest {
    pub section: String,
    pub item: String,
    pub value: String,
    /// Create the section if it is missing
    pub force_section: bool,
    /// Start from an empty document if the file does not exist
    pub create_file: bool,
}

/// A removal request; see [`RemoveTarget::from_parts`] for precedence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveRequest {
    pub section: Option<String>,
    pub item: Option<String>,
}

/// Result of an executed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    /// Operation that was performed
    pub operation: OperationType,

    /// File operated on
    pub path: PathBuf,

    /// What a remove request did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removal: Option<Removal>,

    /// Commit details, `None` when the document was unchanged and not rewritten
    pub commit: Option<CommitOutcome>,

    /// Backup moved back into place by a recover request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_from: Option<PathBuf>,
}

impl OperationResult {
    fn new(operation: OperationType, path: &Path) -> Self {
        Self {
            operation,
            path: path.to_path_buf(),
            removal: None,
            commit: None,
            restored_from: None,
        }
    }

    fn with_commit(mut self, commit: Option<CommitOutcome>) -> Self {
        self.commit = commit;
        self
    }

    fn with_removal(mut self, removal: Removal) -> Self {
        self.removal = Some(removal);
        self
    }

    /// Whether the file was rewritten
    #[must_use]
    pub fn written(&self) -> bool {
        self.commit.is_some()
    }

    /// Backup the commit could not delete, if any
    #[must_use]
    pub fn leftover_backup(&self) -> Option<&Path> {
        self.commit
            .as_ref()
            .and_then(|c| c.leftover_backup.as_deref())
    }
}

/// Render the view a [`GetRequest`] selects
///
/// # Errors
/// `FileNotFound`, `Parse`, or `Io` from loading; `InvalidParameters` for
/// flag combinations that cannot be satisfied; `SectionNotFound` and
/// `ItemNotFound` for missing targets.
pub fn run_get(path: &Path, request: &GetRequest) -> EditResult<String> {
    let store = ConfigStore::load(path)?;
    let sep = request.separator.as_str();

    if request.sections_only {
        let names = store.list_sections();
        return if request.json {
            display::to_json(&names)
        } else {
            Ok(display::format_sections(&names))
        };
    }

    match (request.section.as_deref(), request.item.as_deref()) {
        (None, Some(_)) => Err(EditError::InvalidParameters(
            "--item requires --section".to_string(),
        )),
        (None, None) if request.value_only => Err(EditError::InvalidParameters(
            "--get-value requires --section and --item".to_string(),
        )),
        (None, None) => {
            if request.json {
                display::to_json(store.document())
            } else {
                Ok(display::format_document(store.document(), sep))
            }
        }
        (Some(_), None) if request.value_only => Err(EditError::InvalidParameters(
            "--get-value requires --item".to_string(),
        )),
        (Some(section), None) => {
            let entries = store.list_items(section)?;
            if request.json {
                if request.names_only {
                    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
                    display::to_json(&keys)
                } else {
                    display::to_json(entries)
                }
            } else {
                Ok(display::format_section(
                    section,
                    entries,
                    sep,
                    request.print_section,
                    request.names_only,
                ))
            }
        }
        (Some(section), Some(item)) => {
            let value = store.get_item(section, item)?;
            if request.json {
                display::to_json(value)
            } else {
                let mut out = String::new();
                if request.print_section {
                    let _ = writeln!(out, "[{section}]");
                }
                out.push_str(&display::format_item(item, value, sep, request.value_only));
                Ok(out)
            }
        }
    }
}

/// Set one item and commit the file
///
/// # Errors
/// Load errors, `SectionNotFound` without `force_section`,
/// `InvalidParameters` for unwritable names, and commit errors.
pub fn run_set(path: &Path, request: &SetRequest) -> EditResult<OperationResult> {
    let mut store = if request.create_file {
        ConfigStore::load_or_empty(path)?
    } else {
        ConfigStore::load(path)?
    };
    store.set_item(
        &request.section,
        &request.item,
        &request.value,
        request.force_section,
    )?;
    let commit = commit_if_modified(path, &store)?;
    Ok(OperationResult::new(OperationType::Set, path).with_commit(commit))
}

/// Remove an item or a section and commit the file
///
/// Missing sections and items are not errors; the file is then left as is.
///
/// # Errors
/// Load errors and commit errors
pub fn run_remove(path: &Path, request: &RemoveRequest) -> EditResult<OperationResult> {
    let mut store = ConfigStore::load(path)?;
    let target = RemoveTarget::from_parts(request.section.as_deref(), request.item.as_deref());
    let removal = store.remove(target);
    let commit = commit_if_modified(path, &store)?;
    Ok(OperationResult::new(OperationType::Remove, path)
        .with_removal(removal)
        .with_commit(commit))
}

/// Move the newest leftover backup of `path` back into place
///
/// # Errors
/// `FileNotFound` if there is no backup, `InvalidParameters` if `path`
/// exists and `force` is false, `Io` if the rename fails.
pub fn run_recover(path: &Path, force: bool) -> EditResult<OperationResult> {
    let restored = backup::restore_latest(path, force)?;
    let mut result = OperationResult::new(OperationType::Recover, path);
    result.restored_from = Some(restored);
    Ok(result)
}

fn commit_if_modified(path: &Path, store: &ConfigStore) -> EditResult<Option<CommitOutcome>> {
    if !store.is_modified() {
        debug!(path = %path.display(), "document unchanged, skipping write");
        return Ok(None);
    }
    AtomicWriter::new().commit(path, store).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "[net]\nhost = localhost\nport = 80\n\n[db]\nname = app\n\n";

    fn sample_file() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.ini");
        fs::write(&path, SAMPLE).unwrap();
        (dir, path)
    }

    fn get(section: Option<&str>, item: Option<&str>) -> GetRequest {
        GetRequest {
            section: section.map(String::from),
            item: item.map(String::from),
            ..GetRequest::default()
        }
    }

    #[test]
    fn test_get_whole_file() {
        let (_dir, path) = sample_file();
        let out = run_get(&path, &GetRequest::default()).unwrap();
        assert_eq!(out, SAMPLE);
    }

    #[test]
    fn test_get_sections_only() {
        let (_dir, path) = sample_file();
        let request = GetRequest {
            sections_only: true,
            section: Some("ignored".into()),
            ..GetRequest::default()
        };
        assert_eq!(run_get(&path, &request).unwrap(), "[net]\n[db]\n\n");
    }

    #[test]
    fn test_get_item_value_only() {
        let (_dir, path) = sample_file();
        let request = GetRequest {
            value_only: true,
            ..get(Some("net"), Some("port"))
        };
        assert_eq!(run_get(&path, &request).unwrap(), "80\n\n");
    }

    #[test]
    fn test_get_value_needs_item() {
        let (_dir, path) = sample_file();
        let request = GetRequest {
            value_only: true,
            ..get(Some("net"), None)
        };
        assert!(matches!(
            run_get(&path, &request),
            Err(EditError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_get_missing_targets() {
        let (_dir, path) = sample_file();
        assert!(matches!(
            run_get(&path, &get(Some("nope"), None)),
            Err(EditError::SectionNotFound { .. })
        ));
        assert!(matches!(
            run_get(&path, &get(Some("net"), Some("nope"))),
            Err(EditError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_get_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            run_get(&dir.path().join("none.ini"), &GetRequest::default()),
            Err(EditError::FileNotFound { .. })
        ));
        assert!(matches!(
            run_get(dir.path(), &GetRequest::default()),
            Err(EditError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_set_then_get() {
        let (dir, path) = sample_file();
        let request = SetRequest {
            section: "net".into(),
            item: "host".into(),
            value: "127.0.0.1".into(),
            force_section: false,
            create_file: false,
        };
        let result = run_set(&path, &request).unwrap();
        assert!(result.written());
        assert!(result.leftover_backup().is_none());
        assert_eq!(
            run_get(&path, &get(Some("net"), Some("host"))).unwrap(),
            "host = 127.0.0.1\n\n"
        );
        assert!(!dir.path().join("a.ini.bak").exists());
    }

    #[test]
    fn test_set_unchanged_does_not_rewrite() {
        let (_dir, path) = sample_file();
        let request = SetRequest {
            section: "net".into(),
            item: "host".into(),
            value: "localhost".into(),
            force_section: false,
            create_file: false,
        };
        assert!(!run_set(&path, &request).unwrap().written());
    }

    #[test]
    fn test_set_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.ini");
        let request = SetRequest {
            section: "app".into(),
            item: "mode".into(),
            value: "dev".into(),
            force_section: true,
            create_file: true,
        };
        run_set(&path, &request).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[app]\nmode = dev\n\n");
    }

    #[test]
    fn test_remove_reports_what_happened() {
        let (_dir, path) = sample_file();
        let result = run_remove(
            &path,
            &RemoveRequest {
                section: Some("db".into()),
                item: None,
            },
        )
        .unwrap();
        assert_eq!(result.removal, Some(Removal::Section("db".into())));
        assert!(result.written());

        let result = run_remove(
            &path,
            &RemoveRequest {
                section: Some("db".into()),
                item: None,
            },
        )
        .unwrap();
        assert_eq!(result.removal, Some(Removal::Nothing));
        assert!(!result.written());
    }

    #[test]
    fn test_recover_restores_backup() {
        let (dir, path) = sample_file();
        let backup = dir.path().join("a.ini.bak");
        fs::rename(&path, &backup).unwrap();

        let result = run_recover(&path, false).unwrap();
        assert_eq!(result.operation, OperationType::Recover);
        assert_eq!(result.restored_from.as_deref(), Some(backup.as_path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
    }

    #[test]
    fn test_set_rejects_value_that_would_be_cut_short() {
        let (_dir, path) = sample_file();
        for value in ["abc ;def", " x "] {
            let request = SetRequest {
                section: "net".into(),
                item: "pw".into(),
                value: value.into(),
                force_section: false,
                create_file: false,
            };
            assert!(matches!(
                run_set(&path, &request),
                Err(EditError::InvalidParameters(_))
            ));
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
    }

    #[test]
    fn test_result_json() {
        let (_dir, path) = sample_file();
        let result = run_remove(
            &path,
            &RemoveRequest {
                section: Some("net".into()),
                item: Some("port".into()),
            },
        )
        .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&display::to_json(&result).unwrap()).unwrap();
        assert_eq!(json["operation"], "remove");
        assert_eq!(json["removal"]["item"]["section"], "net");
        assert_eq!(json["removal"]["item"]["item"], "port");
        assert!(json["commit"]["leftover_backup"].is_null());
        assert!(json.get("restored_from").is_none());
    }
}
