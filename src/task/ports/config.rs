//! Workflow configuration provider port.

use crate::task::domain::{ErrorCode, WorkflowConfig, WorkflowValidationError};
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Source of workflow configuration snapshots.
pub trait WorkflowConfigProvider: Send + Sync {
    /// Loads and validates the configuration for a base directory.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowConfigError`] when the configuration cannot be read
    /// or references undeclared statuses.
    fn load(&self, base_dir: &Utf8Path) -> Result<WorkflowConfig, WorkflowConfigError>;
}

/// Errors returned while loading workflow configuration.
#[derive(Debug, Error)]
pub enum WorkflowConfigError {
    /// The settings are inconsistent.
    #[error("invalid workflow configuration: {0}")]
    Invalid(#[from] WorkflowValidationError),

    /// The configuration file is not valid YAML of the expected shape.
    #[error("cannot parse workflow configuration {path}: {message}")]
    Parse {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Parser message.
        message: String,
    },

    /// The configuration file could not be read.
    #[error("cannot read workflow configuration {path}: {source}")]
    Io {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },
}

impl WorkflowConfigError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Invalid(_) | Self::Parse { .. } => ErrorCode::Config,
            Self::Io { .. } => ErrorCode::Io,
        }
    }
}
