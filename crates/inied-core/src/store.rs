//! In-memory configuration store
//!
//! Holds one parsed document and exposes the query and mutation primitives.
//! Nothing in here writes to disk; see [`crate::commit`] for that.
//!
//! Lookups are strict and removals are tolerant: `get_item` on a missing
//! section or item is an error, while [`ConfigStore::remove`] on a missing
//! section or item succeeds without changing anything.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::format::{self, Document, Entry};

/// What a remove request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveTarget<'a> {
    /// A single item; takes precedence over removing its section
    Item { section: &'a str, item: &'a str },
    /// A whole section with all its items
    Section(&'a str),
    /// Nothing was named
    Nothing,
}

impl<'a> RemoveTarget<'a> {
    /// Build a target from optional section and item names
    ///
    /// Section and item together select the item. A section alone selects the
    /// section. An item without a section selects nothing.
    #[must_use]
    pub fn from_parts(section: Option<&'a str>, item: Option<&'a str>) -> Self {
        match (section, item) {
            (Some(section), Some(item)) => Self::Item { section, item },
            (Some(section), None) => Self::Section(section),
            (None, _) => Self::Nothing,
        }
    }
}

/// What a remove request actually did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Removal {
    Item { section: String, item: String },
    Section(String),
    Nothing,
}

/// A parsed configuration document plus a dirty flag
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    doc: Document,
    modified: bool,
}

impl ConfigStore {
    /// Load a store from an existing regular file
    ///
    /// # Errors
    /// `FileNotFound` if the path is missing or not a regular file, `Io` if it
    /// cannot be read, `Parse` if it is not a well-formed INI document.
    pub fn load(path: &Path) -> EditResult<Self> {
        if !path.is_file() {
            return Err(EditError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| EditError::io(path, &e))?;
        let doc = format::parse(&text).map_err(|e| EditError::parse(path, e))?;
        debug!(
            path = %path.display(),
            sections = doc.sections().len(),
            "loaded document"
        );
        Ok(Self::from_document(doc))
    }

    /// Load a store, starting empty when the file does not exist yet
    ///
    /// # Errors
    /// As [`ConfigStore::load`], except that a missing path is not an error.
    /// A path that exists but is not a regular file is still `FileNotFound`.
    pub fn load_or_empty(path: &Path) -> EditResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "file absent, starting empty document");
            Ok(Self::default())
        }
    }

    /// Parse a store from INI text
    ///
    /// # Errors
    /// Returns `Parse` if the text is not a well-formed INI document
    pub fn parse_str(text: &str) -> EditResult<Self> {
        let doc = format::parse(text).map_err(|e| EditError::parse("<memory>", e))?;
        Ok(Self::from_document(doc))
    }

    #[must_use]
    pub fn from_document(doc: Document) -> Self {
        Self {
            doc,
            modified: false,
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Whether any mutation changed the document since it was loaded
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    #[must_use]
    pub fn to_ini_string(&self) -> String {
        self.doc.to_ini_string()
    }

    #[must_use]
    pub fn has_section(&self, section: &str) -> bool {
        self.doc.section(section).is_some()
    }

    /// Section names in document order
    #[must_use]
    pub fn list_sections(&self) -> Vec<&str> {
        self.doc.sections().iter().map(format::Section::name).collect()
    }

    /// Items of a section in document order
    ///
    /// # Errors
    /// Returns `SectionNotFound` if the section is absent
    pub fn list_items(&self, section: &str) -> EditResult<&[Entry]> {
        self.doc
            .section(section)
            .map(format::Section::entries)
            .ok_or_else(|| section_not_found(section))
    }

    /// Value of one item
    ///
    /// # Errors
    /// `SectionNotFound` if the section is absent, `ItemNotFound` if the
    /// section exists but the key does not.
    pub fn get_item(&self, section: &str, item: &str) -> EditResult<&str> {
        let found = self
            .doc
            .section(section)
            .ok_or_else(|| section_not_found(section))?;
        found.get(item).ok_or_else(|| EditError::ItemNotFound {
            section: section.to_string(),
            item: item.to_string(),
        })
    }

    /// Create or overwrite an item
    ///
    /// With `force_section`, a missing section is created empty first.
    /// Calling this repeatedly with the same arguments leaves the same state.
    ///
    /// # Errors
    /// `InvalidParameters` for names or values that would not survive being
    /// written out, `SectionNotFound` if the section is absent and
    /// `force_section` is false.
    pub fn set_item(
        &mut self,
        section: &str,
        item: &str,
        value: &str,
        force_section: bool,
    ) -> EditResult<()> {
        format::validate_section_name(section).map_err(EditError::InvalidParameters)?;
        format::validate_key(item).map_err(EditError::InvalidParameters)?;
        format::validate_value(value).map_err(EditError::InvalidParameters)?;

        if !self.has_section(section) {
            if !force_section {
                return Err(section_not_found(section));
            }
            debug!(section, "creating section");
            self.doc.ensure_section(section);
            self.modified = true;
        }

        if self.doc.ensure_section(section).set(item, value) {
            debug!(section, item, "item set");
            self.modified = true;
        }
        Ok(())
    }

    /// Remove one item. A missing item is not an error.
    ///
    /// # Errors
    /// Returns `SectionNotFound` if the section is absent
    pub fn remove_item(&mut self, section: &str, item: &str) -> EditResult<bool> {
        let found = self
            .doc
            .section_mut(section)
            .ok_or_else(|| section_not_found(section))?;
        let removed = found.remove(item).is_some();
        if removed {
            debug!(section, item, "item removed");
            self.modified = true;
        }
        Ok(removed)
    }

    /// Remove a section and its items. A missing section is not an error.
    pub fn remove_section(&mut self, section: &str) -> bool {
        let removed = self.doc.remove_section(section).is_some();
        if removed {
            debug!(section, "section removed");
            self.modified = true;
        }
        removed
    }

    /// Apply a remove request with the tolerant policy
    ///
    /// An item target only touches that item, even when the section would
    /// otherwise be removable. Missing sections and items yield
    /// [`Removal::Nothing`].
    pub fn remove(&mut self, target: RemoveTarget<'_>) -> Removal {
        match target {
            RemoveTarget::Item { section, item } => {
                if matches!(self.remove_item(section, item), Ok(true)) {
                    Removal::Item {
                        section: section.to_string(),
                        item: item.to_string(),
                    }
                } else {
                    Removal::Nothing
                }
            }
            RemoveTarget::Section(section) => {
                if self.remove_section(section) {
                    Removal::Section(section.to_string())
                } else {
                    Removal::Nothing
                }
            }
            RemoveTarget::Nothing => Removal::Nothing,
        }
    }
}

fn section_not_found(section: &str) -> EditError {
    EditError::SectionNotFound {
        section: section.to_string(),
    }
}
