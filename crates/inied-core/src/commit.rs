//! Crash-safe file replacement
//!
//! The commit protocol, in order:
//!
//! 1. serialize the document;
//! 2. write it to a temp file in the target's directory and sync it;
//! 3. pick a backup path that does not exist yet;
//! 4. rename the original to the backup path;
//! 5. rename the temp file to the original path;
//! 6. delete the backup.
//!
//! Until step 4 the original is untouched. Between 4 and 5 the original
//! content lives on under the backup name. After 5 the new content is live and
//! a failure in step 6 only leaves a stray backup behind.
//!
//! Each step boundary is a separate type so the protocol cannot be driven out
//! of order. Dropping a stage before step 5 deletes the temp file.

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::backup::{self, parent_dir};
use crate::error::{EditError, EditResult};
use crate::store::ConfigStore;

const TEMP_PREFIX: &str = "config-";
const TEMP_SUFFIX: &str = ".ini.tmp";

/// Result of a completed commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    /// File that now holds the new content
    pub path: PathBuf,
    /// Temp file the content was staged in (renamed away by now)
    pub temp_path: PathBuf,
    /// Backup that could not be deleted in the final step
    pub leftover_backup: Option<PathBuf>,
}

/// Replaces configuration files without ever leaving a partial write
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicWriter;

impl AtomicWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Serialize `store` and commit it to `path`
    ///
    /// # Errors
    /// `Io` if staging or retiring the original fails (original untouched),
    /// `RecoveryNeeded` if the original was retired but the new content could
    /// not be installed.
    pub fn commit(&self, path: &Path, store: &ConfigStore) -> EditResult<CommitOutcome> {
        self.commit_bytes(path, store.to_ini_string().as_bytes())
    }

    /// Commit raw bytes to `path`
    ///
    /// # Errors
    /// See [`AtomicWriter::commit`]
    pub fn commit_bytes(&self, path: &Path, content: &[u8]) -> EditResult<CommitOutcome> {
        let outcome = self
            .stage(path, content)?
            .retire_original()?
            .install()?
            .cleanup();
        info!(path = %outcome.path.display(), bytes = content.len(), "commit complete");
        Ok(outcome)
    }

    /// Steps 2 and 3: write the temp file and choose the backup path
    ///
    /// # Errors
    /// Returns `Io` if the temp file cannot be created, written, or synced
    pub fn stage(&self, path: &Path, content: &[u8]) -> EditResult<StagedCommit> {
        let dir = parent_dir(path);
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&dir)
            .map_err(|e| EditError::io(&dir, &e))?;
        debug!(temp = %temp.path().display(), "created temp file");

        let temp_path = temp.path().to_path_buf();
        write_synced(&mut temp, content).map_err(|e| EditError::io(&temp_path, &e))?;

        // Keep the original's mode on the replacement
        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(&temp_path, meta.permissions())
                .map_err(|e| EditError::io(&temp_path, &e))?;
        }

        let backup = path.exists().then(|| backup::backup_path_for(path));
        debug!(
            path = %path.display(),
            backup = ?backup,
            "staged commit"
        );

        Ok(StagedCommit {
            target: path.to_path_buf(),
            temp,
            backup,
        })
    }
}

/// New content is on disk in a temp file; the original is untouched
#[derive(Debug)]
pub struct StagedCommit {
    target: PathBuf,
    temp: NamedTempFile,
    backup: Option<PathBuf>,
}

impl StagedCommit {
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Where the original will be moved; `None` when there is no original
    #[must_use]
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Step 4: move the original to its backup path
    ///
    /// # Errors
    /// Returns `Io` if the rename fails; the original is still in place
    pub fn retire_original(self) -> EditResult<RetiredCommit> {
        if let Some(backup) = &self.backup {
            fs::rename(&self.target, backup).map_err(|e| EditError::io(&self.target, &e))?;
            debug!(
                from = %self.target.display(),
                to = %backup.display(),
                "original moved to backup"
            );
        }
        Ok(RetiredCommit {
            target: self.target,
            temp: self.temp,
            backup: self.backup,
        })
    }
}

/// The original lives under its backup name; the target path is vacant
#[derive(Debug)]
pub struct RetiredCommit {
    target: PathBuf,
    temp: NamedTempFile,
    backup: Option<PathBuf>,
}

impl RetiredCommit {
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    #[must_use]
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Step 5: move the temp file onto the target path
    ///
    /// # Errors
    /// `RecoveryNeeded` if the rename fails after the original was retired,
    /// `Io` if it fails when there was no original.
    pub fn install(self) -> EditResult<InstalledCommit> {
        let temp_path = self.temp.path().to_path_buf();
        match self.temp.persist(&self.target) {
            Ok(_) => {
                debug!(
                    from = %temp_path.display(),
                    to = %self.target.display(),
                    "temp file installed"
                );
                sync_parent(&self.target);
                Ok(InstalledCommit {
                    target: self.target,
                    temp_path,
                    backup: self.backup,
                })
            }
            // The temp file inside `err` is deleted when it drops
            Err(err) => match self.backup {
                Some(backup) => {
                    error!(
                        path = %self.target.display(),
                        backup = %backup.display(),
                        error = %err.error,
                        "could not install new content; original kept as backup"
                    );
                    Err(EditError::RecoveryNeeded {
                        path: self.target,
                        backup,
                        message: err.error.to_string(),
                    })
                }
                None => Err(EditError::io(&self.target, &err.error)),
            },
        }
    }
}

/// New content is live; only the backup remains to be cleaned up
#[derive(Debug)]
pub struct InstalledCommit {
    target: PathBuf,
    temp_path: PathBuf,
    backup: Option<PathBuf>,
}

impl InstalledCommit {
    /// Step 6: delete the backup. Failure here does not fail the commit.
    #[must_use]
    pub fn cleanup(self) -> CommitOutcome {
        let leftover_backup = match self.backup {
            Some(backup) => match fs::remove_file(&backup) {
                Ok(()) => {
                    debug!(backup = %backup.display(), "backup removed");
                    None
                }
                Err(e) => {
                    warn!(
                        backup = %backup.display(),
                        error = %e,
                        "commit succeeded but backup could not be removed"
                    );
                    Some(backup)
                }
            },
            None => None,
        };
        CommitOutcome {
            path: self.target,
            temp_path: self.temp_path,
            leftover_backup,
        }
    }
}

fn write_synced(temp: &mut NamedTempFile, content: &[u8]) -> std::io::Result<()> {
    temp.write_all(content)?;
    temp.flush()?;
    temp.as_file().sync_all()
}

/// Best-effort sync of the directory entry after a rename
fn sync_parent(path: &Path) {
    #[cfg(unix)]
    {
        let dir = parent_dir(path);
        if let Err(e) = fs::File::open(&dir).and_then(|d| d.sync_all()) {
            debug!(dir = %dir.display(), error = %e, "directory sync skipped");
        }
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}
