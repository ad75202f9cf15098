//! Error types for task domain validation and parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable error codes surfaced to callers.
///
/// Agents and human tooling branch on these codes to decide whether to
/// reload and retry, escalate, or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The record text could not be parsed.
    ParseError,
    /// The filename-derived id disagrees with the declared id.
    IdMismatch,
    /// The record does not exist.
    NotFound,
    /// Another writer holds the record lock.
    Locked,
    /// The caller-supplied version is stale.
    Conflict,
    /// The requested status change is not allowed.
    InvalidTransition,
    /// One or more prerequisite records are not done.
    DependenciesUnmet,
    /// The caller may not mutate the record.
    Unauthorized,
    /// The record is not in a state that permits the operation.
    GateViolation,
    /// A caller-supplied value failed validation.
    InvalidInput,
    /// The workflow configuration is invalid.
    Config,
    /// An unexpected I/O failure.
    Io,
}

impl ErrorCode {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::IdMismatch => "ID_MISMATCH",
            Self::NotFound => "NOT_FOUND",
            Self::Locked => "LOCKED",
            Self::Conflict => "CONFLICT",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::DependenciesUnmet => "DEPENDENCIES_UNMET",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::GateViolation => "GATE_VIOLATION",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Config => "CONFIG",
            Self::Io => "IO",
        }
    }

    /// Returns whether reloading fresh state and retrying may succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Locked | Self::Conflict)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is empty or contains forbidden characters.
    #[error("invalid task id '{0}'")]
    InvalidTaskId(String),

    /// The status value is empty after trimming.
    #[error("status must not be empty")]
    EmptyStatus,

    /// The caller identifier is empty after trimming.
    #[error("caller id must not be empty")]
    EmptyCallerId,

    /// Versions start at 1.
    #[error("invalid version {0}, expected an integer >= 1")]
    InvalidVersion(u64),

    /// The version counter cannot be advanced further.
    #[error("version counter overflow")]
    VersionOverflow,

    /// Section headings must be a single non-empty line.
    #[error("invalid section heading '{0}'")]
    InvalidSectionHeading(String),

    /// The section body would not read back as one section.
    #[error("invalid body for section '{heading}': {reason}")]
    InvalidSectionBody {
        /// Heading of the section being written.
        heading: String,
        /// What makes the body unsafe to store.
        reason: String,
    },

    /// The field is managed by typed accessors and cannot be set directly.
    #[error("field '{0}' is reserved")]
    ReservedField(String),

    /// Field keys must be non-empty.
    #[error("field key must not be empty")]
    EmptyFieldKey,

    /// A field update request changes nothing.
    #[error("update request contains no changes")]
    EmptyUpdate,
}

impl TaskDomainError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidInput
    }
}
