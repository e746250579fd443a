//! Backup naming and recovery
//!
//! A commit moves the original file to `<path>.bak` (or a timestamped
//! variant) for the short window between retiring the original and installing
//! the replacement. A backup still on disk afterwards means a commit was
//! interrupted; [`restore_latest`] puts it back.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

use crate::error::{EditError, EditResult};

/// Suffix appended to the original file name for its backup
pub const BACKUP_SUFFIX: &str = ".bak";

/// `<path>.bak`
#[must_use]
pub fn plain_backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Pick a backup path that does not exist yet
///
/// Uses `<path>.bak` when free, otherwise `<path>.bak-<secs>.<micros>`, and
/// appends a counter in the unlikely case that is taken too.
#[must_use]
pub fn backup_path_for(path: &Path) -> PathBuf {
    let plain = plain_backup_path(path);
    if !plain.exists() {
        return plain;
    }

    let now = Utc::now();
    let mut stamped = plain.clone().into_os_string();
    stamped.push(format!(
        "-{}.{:06}",
        now.timestamp(),
        now.timestamp_subsec_micros()
    ));
    let mut candidate = PathBuf::from(&stamped);
    let mut counter = 1u32;
    while candidate.exists() {
        let mut numbered = stamped.clone();
        numbered.push(format!("-{counter}"));
        candidate = PathBuf::from(numbered);
        counter += 1;
    }
    debug!(
        existing = %plain.display(),
        backup = %candidate.display(),
        "backup name taken, using timestamped name"
    );
    candidate
}

/// Backups left next to `path`, newest first
///
/// # Errors
/// Returns `Io` if the containing directory cannot be read
pub fn find_backups(path: &Path) -> EditResult<Vec<PathBuf>> {
    let dir = parent_dir(path);
    let Some(file_name) = path.file_name() else {
        return Ok(Vec::new());
    };
    let plain = format!("{}{BACKUP_SUFFIX}", file_name.to_string_lossy());
    let stamped_prefix = format!("{plain}-");

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|e| EditError::io(&dir, &e))? {
        let entry = entry.map_err(|e| EditError::io(&dir, &e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name != plain && !name.starts_with(&stamped_prefix) {
            continue;
        }
        let candidate = entry.path();
        if !candidate.is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((modified, candidate));
    }

    // Newest first; names break ties so the order is stable
    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

/// Move the newest backup of `path` back into place
///
/// Returns the backup that was restored.
///
/// # Errors
/// `FileNotFound` if no backup exists, `InvalidParameters` if `path` exists
/// and `force` is false, `Io` if the rename fails.
pub fn restore_latest(path: &Path, force: bool) -> EditResult<PathBuf> {
    let backups = find_backups(path)?;
    let Some(latest) = backups.into_iter().next() else {
        return Err(EditError::FileNotFound {
            path: plain_backup_path(path),
        });
    };

    if path.exists() && !force {
        return Err(EditError::InvalidParameters(format!(
            "{} exists; use --force to replace it with {}",
            path.display(),
            latest.display()
        )));
    }

    fs::rename(&latest, path).map_err(|e| EditError::io(&latest, &e))?;
    info!(
        path = %path.display(),
        backup = %latest.display(),
        "restored backup"
    );
    Ok(latest)
}

pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
