//! Audit trail entries for accepted mutations.

use super::CallerId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of accepted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOperation {
    /// A status change.
    Transition,
    /// Metadata field edits.
    UpdateFields,
    /// A section replace or append.
    WriteSection,
}

impl AuditOperation {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transition => "transition",
            Self::UpdateFields => "update_fields",
            Self::WriteSection => "write_section",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one accepted mutation.
///
/// # Examples
///
/// ```rust
/// use dossier::task::domain::{AuditEntry, AuditOperation, CallerId};
/// use mockable::DefaultClock;
///
/// let caller = CallerId::new("alice").expect("valid caller");
/// let entry = AuditEntry::new(AuditOperation::Transition, Some(caller), &DefaultClock)
///     .with_context("task_id", "task-001");
/// assert_eq!(entry.context.get("task_id"), Some(&"task-001".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the mutation was accepted.
    pub timestamp: DateTime<Utc>,
    /// Who performed the mutation, when known.
    pub caller_id: Option<CallerId>,
    /// What kind of mutation was performed.
    pub operation: AuditOperation,
    /// Structured details such as task id and versions.
    pub context: Map<String, Value>,
}

impl AuditEntry {
    /// Creates an entry stamped with the current clock time.
    #[must_use]
    pub fn new(operation: AuditOperation, caller_id: Option<CallerId>, clock: &impl Clock) -> Self {
        Self {
            timestamp: clock.utc(),
            caller_id,
            operation,
            context: Map::new(),
        }
    }

    /// Adds a context value.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}
