//! Audit sink port.

use crate::task::domain::AuditEntry;
use async_trait::async_trait;
use thiserror::Error;

/// Append-only destination for audit entries.
///
/// Appends are best-effort: the lifecycle service logs and discards sink
/// failures so they never change the outcome of a mutation.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError`] when the entry cannot be recorded.
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditSinkError>;
}

/// Errors returned by audit sinks.
#[derive(Debug, Error)]
pub enum AuditSinkError {
    /// The entry could not be serialized.
    #[error("cannot serialize audit entry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The log could not be written.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The sink is unavailable.
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}
