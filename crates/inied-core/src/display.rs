//! Output rendering for `get`

use serde::Serialize;
use std::fmt::Write as _;

use crate::error::{EditError, EditResult};
use crate::format::{Document, Entry};

/// Default text between a key and its value
pub const DEFAULT_SEPARATOR: &str = " = ";

/// `[name]` per section, then a blank line
#[must_use]
pub fn format_sections(names: &[&str]) -> String {
    let mut out = String::new();
    for name in names {
        let _ = writeln!(out, "[{name}]");
    }
    out.push('\n');
    out
}

/// Every section with its items, each section followed by a blank line
#[must_use]
pub fn format_document(doc: &Document, separator: &str) -> String {
    let mut out = String::new();
    for section in doc.sections() {
        let _ = writeln!(out, "[{}]", section.name());
        for entry in section.entries() {
            let _ = writeln!(out, "{}{separator}{}", entry.key, entry.value);
        }
        out.push('\n');
    }
    out
}

/// One section's items, optionally under its header or as bare key names
#[must_use]
pub fn format_section(
    name: &str,
    entries: &[Entry],
    separator: &str,
    header: bool,
    names_only: bool,
) -> String {
    let mut out = String::new();
    if header {
        let _ = writeln!(out, "[{name}]");
    }
    for entry in entries {
        if names_only {
            let _ = writeln!(out, "{}", entry.key);
        } else {
            let _ = writeln!(out, "{}{separator}{}", entry.key, entry.value);
        }
    }
    out.push('\n');
    out
}

/// A single item as `key<sep>value`, or just the value
#[must_use]
pub fn format_item(key: &str, value: &str, separator: &str, value_only: bool) -> String {
    if value_only {
        format!("{value}\n\n")
    } else {
        format!("{key}{separator}{value}\n\n")
    }
}

/// Pretty JSON for any rendered view
///
/// # Errors
/// Returns `Internal` if serialization fails
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> EditResult<String> {
    serde_json::to_string_pretty(value)
        .map(|mut json| {
            json.push('\n');
            json
        })
        .map_err(|e| EditError::Internal(format!("JSON serialization failed: {e}")))
}
