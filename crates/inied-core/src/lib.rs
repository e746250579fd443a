//! inied core - INI document store and crash-safe commits
//!
//! This crate holds everything behind the `inied` command: the INI format,
//! the in-memory store with its get/set/remove rules, the atomic commit
//! protocol, backup recovery, and the exit-status mapping.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod backup;
pub mod commit;
pub mod display;
pub mod error;
pub mod exit;
pub mod format;
pub mod ops;
pub mod store;

pub use commit::{AtomicWriter, CommitOutcome};
pub use error::{EditError, EditResult};
pub use exit::ExitStatus;
pub use format::Document;
pub use store::{ConfigStore, RemoveTarget, Removal};
