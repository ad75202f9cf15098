//! Optimistic-concurrency version counter.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic record version, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Version(u64);

impl Version {
    /// Version assigned to freshly created records.
    pub const INITIAL: Self = Self(1);

    /// Creates a validated version.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidVersion`] when `value` is zero.
    pub const fn new(value: u64) -> Result<Self, TaskDomainError> {
        if value == 0 {
            return Err(TaskDomainError::InvalidVersion(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the version that follows this one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::VersionOverflow`] at `u64::MAX`.
    pub const fn next(self) -> Result<Self, TaskDomainError> {
        match self.0.checked_add(1) {
            Some(value) => Ok(Self(value)),
            None => Err(TaskDomainError::VersionOverflow),
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl TryFrom<u64> for Version {
    type Error = TaskDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Version> for u64 {
    fn from(value: Version) -> Self {
        value.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
