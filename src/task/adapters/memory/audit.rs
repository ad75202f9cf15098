//! In-memory audit sink.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::task::{
    domain::AuditEntry,
    ports::{AuditSink, AuditSinkError},
};

/// Collects audit entries in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError::Unavailable`] when the entry lock is
    /// poisoned.
    pub fn entries(&self) -> Result<Vec<AuditEntry>, AuditSinkError> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| AuditSinkError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditSinkError> {
        self.entries
            .lock()
            .map_err(|err| AuditSinkError::Unavailable(err.to_string()))?
            .push(entry.clone());
        Ok(())
    }
}
