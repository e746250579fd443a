//! Process exit status
//!
//! Each failure kind owns one bit so several can be reported at once.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::EditError;

/// Bitmask exit status; zero means full success
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExitStatus(u8);

impl ExitStatus {
    pub const SUCCESS: Self = Self(0x00);
    pub const ITEM_NOT_FOUND: Self = Self(0x01);
    pub const SECTION_NOT_FOUND: Self = Self(0x02);
    pub const FILE_NOT_FOUND: Self = Self(0x04);
    pub const INVALID_PARAMS: Self = Self(0x08);
    /// Temp file, rename, or read failure
    pub const IO_FAILURE: Self = Self(0x10);
    /// Unparseable input or an internal error
    pub const UNEXPECTED: Self = Self(0x20);

    #[must_use]
    pub fn code(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ExitStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExitStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<&EditError> for ExitStatus {
    fn from(err: &EditError) -> Self {
        match err {
            EditError::FileNotFound { .. } => Self::FILE_NOT_FOUND,
            EditError::SectionNotFound { .. } => Self::SECTION_NOT_FOUND,
            EditError::ItemNotFound { .. } => Self::ITEM_NOT_FOUND,
            EditError::InvalidParameters(_) => Self::INVALID_PARAMS,
            EditError::Io { .. } | EditError::RecoveryNeeded { .. } => Self::IO_FAILURE,
            EditError::Parse { .. } | EditError::Internal(_) => Self::UNEXPECTED,
        }
    }
}

impl From<ExitStatus> for i32 {
    fn from(status: ExitStatus) -> Self {
        i32::from(status.0)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
