//! Error types for edit operations

use std::path::PathBuf;
use thiserror::Error;

use crate::format::ParseError;

/// Result type for edit operations
pub type EditResult<T> = Result<T, EditError>;

/// Errors that can occur while loading, editing, or committing a file
#[derive(Debug, Error)]
pub enum EditError {
    /// Target path does not exist or is not a regular file
    #[error("File not found: '{}'", path.display())]
    FileNotFound { path: PathBuf },

    /// Section is absent from the document
    #[error("Section '{section}' not found!")]
    SectionNotFound { section: String },

    /// Key is absent from an existing section
    #[error("Item '{item}' not found in section '{section}'!")]
    ItemNotFound { section: String, item: String },

    /// Malformed or missing arguments
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// File content is not a well-formed INI document
    #[error("Parse error in {} at line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// File I/O error. The original file is untouched.
    #[error("I/O error for {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The original was moved to its backup but the new content never landed
    #[error(
        "Commit of {} interrupted: original content preserved at {}, restore it manually ({message})",
        path.display(),
        backup.display()
    )]
    RecoveryNeeded {
        path: PathBuf,
        backup: PathBuf,
        message: String,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EditError {
    /// Get the error code for CLI output
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::SectionNotFound { .. } => "SECTION_NOT_FOUND",
            Self::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            Self::InvalidParameters(_) => "INVALID_PARAMS",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::RecoveryNeeded { .. } => "RECOVERY_NEEDED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, err: ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            line: err.line,
            message: err.message,
        }
    }
}
