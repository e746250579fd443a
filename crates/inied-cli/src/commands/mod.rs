//! CLI command handlers
//!
//! One module per mode. Handlers turn parsed arguments into the immutable
//! request types of `inied_core::ops` and print the results.

pub mod get;
pub mod recover;
pub mod remove;
pub mod set;

use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use inied_core::display::DEFAULT_SEPARATOR;
use inied_core::{EditError, EditResult};

/// Arguments shared by get, set, and remove
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// File name, ex: 'config.ini'
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Section name, ex: 'network'
    #[arg(short, long)]
    pub section: Option<String>,

    /// Item name, ex: 'ip_address'
    #[arg(short, long)]
    pub item: Option<String>,

    /// Separator printed between item names and values, ex: ' = ', ': '
    #[arg(long, default_value = DEFAULT_SEPARATOR, allow_hyphen_values = true)]
    pub separator: String,

    /// Output more information
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// The single target file, with symlinks resolved
    pub fn target_file(&self) -> EditResult<PathBuf> {
        single_file(&self.files)
    }
}

/// Exactly one `--file` must be given
pub fn single_file(files: &[PathBuf]) -> EditResult<PathBuf> {
    match files {
        [] => Err(EditError::InvalidParameters(
            "--file missing. Try --help".to_string(),
        )),
        [file] => resolve_path(file),
        _ => Err(EditError::InvalidParameters(
            "Too many --file parameters. Try --help".to_string(),
        )),
    }
}

/// Canonicalize a path so commits replace the real file behind a symlink
///
/// A path that does not exist yet keeps its file name under the resolved
/// parent directory.
fn resolve_path(path: &Path) -> EditResult<PathBuf> {
    if path.exists() {
        return fs::canonicalize(path).map_err(|e| EditError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(path.to_path_buf());
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    Ok(fs::canonicalize(parent)
        .map(|dir| dir.join(name))
        .unwrap_or_else(|_| path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_requires_exactly_one() {
        assert!(matches!(
            single_file(&[]),
            Err(EditError::InvalidParameters(msg)) if msg.contains("missing")
        ));
        assert!(matches!(
            single_file(&[PathBuf::from("a.ini"), PathBuf::from("b.ini")]),
            Err(EditError::InvalidParameters(msg)) if msg.contains("Too many")
        ));
    }

    #[test]
    fn test_missing_file_keeps_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("later.ini");
        let resolved = single_file(&[path]).unwrap();
        assert_eq!(resolved.file_name().unwrap(), "later.ini");
        assert!(resolved.is_absolute());
    }
}
