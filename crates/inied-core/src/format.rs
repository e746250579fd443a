//! INI text format
//!
//! Parses the basic `[section]` / `key = value` layout into an ordered
//! [`Document`] and writes it back out. Comments are dropped on parse and
//! never written.

use serde::Serialize;
use std::fmt::Write as _;
use thiserror::Error;

/// Error produced when text is not a well-formed INI document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A single `key = value` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

/// A named group of entries. Keys are unique within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    name: String,
    entries: Vec<Entry>,
}

impl Section {
    /// Create an empty section
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in file order
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Insert or overwrite a key. Returns `true` if the section changed.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            if entry.value == value {
                return false;
            }
            entry.value = value.to_string();
        } else {
            self.entries.push(Entry {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        true
    }

    /// Remove a key, returning its value if it was present
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|e| e.key == key)?;
        Some(self.entries.remove(index).value)
    }
}

/// An ordered sequence of uniquely named sections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Return the named section, appending an empty one if it is absent
    pub fn ensure_section(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    /// Remove a section and all its entries
    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        let index = self.sections.iter().position(|s| s.name == name)?;
        Some(self.sections.remove(index))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Serialize to INI text
    #[must_use]
    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            // Writing to a String cannot fail
            let _ = writeln!(out, "[{}]", section.name);
            for entry in &section.entries {
                let _ = writeln!(out, "{} = {}", entry.key, entry.value);
            }
            out.push('\n');
        }
        out
    }
}

/// Parse INI text into a [`Document`]
///
/// A repeated section header continues the earlier section and a repeated key
/// keeps its last value, so the result always has unique names.
///
/// # Errors
/// Returns a [`ParseError`] for entries outside any section, malformed headers,
/// empty keys, and lines that are neither header, comment nor entry.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut doc = Document::new();
    let mut current: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() || is_comment(line) {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let close = rest
                .find(']')
                .ok_or_else(|| ParseError::new(line_no, "unterminated section header"))?;
            let trailing = rest[close + 1..].trim();
            if !trailing.is_empty() && !is_comment(trailing) {
                return Err(ParseError::new(
                    line_no,
                    format!("unexpected text after section header: '{trailing}'"),
                ));
            }
            let name = rest[..close].trim();
            if name.is_empty() {
                return Err(ParseError::new(line_no, "empty section name"));
            }
            doc.ensure_section(name);
            current = Some(name.to_string());
            continue;
        }

        let Some(split) = line.find(['=', ':']) else {
            return Err(ParseError::new(
                line_no,
                format!("expected 'key = value', found '{line}'"),
            ));
        };
        let key = line[..split].trim();
        if key.is_empty() {
            return Err(ParseError::new(line_no, "empty key"));
        }
        let value = strip_inline_comment(line[split + 1..].trim());

        let Some(section) = current.as_deref() else {
            return Err(ParseError::new(
                line_no,
                format!("entry '{key}' appears before any section header"),
            ));
        };
        doc.ensure_section(section).set(key, value);
    }

    Ok(doc)
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with(';')
}

/// Strip a `;` comment that follows whitespace
fn strip_inline_comment(value: &str) -> &str {
    match value
        .as_bytes()
        .windows(2)
        .position(|w| w[0].is_ascii_whitespace() && w[1] == b';')
    {
        Some(pos) => value[..=pos].trim_end(),
        None => value,
    }
}

/// Check that a section name survives a write/parse cycle
///
/// # Errors
/// Returns a description of the problem
pub fn validate_section_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("section name cannot be empty".to_string());
    }
    if name.trim() != name {
        return Err(format!(
            "section name cannot start or end with whitespace: '{name}'"
        ));
    }
    if name.contains(']') || name.contains(['\n', '\r']) {
        return Err(format!(
            "section name cannot contain ']' or line breaks: '{name}'"
        ));
    }
    Ok(())
}

/// Check that a key survives a write/parse cycle
///
/// # Errors
/// Returns a description of the problem
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("item name cannot be empty".to_string());
    }
    if key.trim() != key {
        return Err(format!(
            "item name cannot start or end with whitespace: '{key}'"
        ));
    }
    if key.contains(['=', ':', '\n', '\r']) {
        return Err(format!(
            "item name cannot contain '=', ':' or line breaks: '{key}'"
        ));
    }
    if key.starts_with(['[', '#', ';']) {
        return Err(format!(
            "item name cannot start with '[', '#' or ';': '{key}'"
        ));
    }
    Ok(())
}

/// Check that a value survives a write/parse cycle
///
/// The parser trims values and treats whitespace followed by `;` as the start
/// of a comment, so neither may appear in a value that is written back.
///
/// # Errors
/// Returns a description of the problem
pub fn validate_value(value: &str) -> Result<(), String> {
    if value.contains(['\n', '\r']) {
        return Err("multi-line values are not supported".to_string());
    }
    if value.trim() != value {
        return Err(format!(
            "value cannot start or end with whitespace: '{value}'"
        ));
    }
    if strip_inline_comment(value).len() != value.len() {
        return Err(format!(
            "value cannot contain ';' after whitespace, it would be read as a comment: '{value}'"
        ));
    }
    Ok(())
}
