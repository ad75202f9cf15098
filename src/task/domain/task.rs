//! Task record aggregate and its metadata fields.

use super::{CallerId, TaskDocument, TaskDomainError, TaskId, TaskStatus, Version};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_yaml::{Mapping, Value};

/// Schema marker written by this version of the codec.
pub const CURRENT_SCHEMA: u32 = 1;

/// Front-matter keys backed by typed [`TaskRecord`] fields.
pub const RESERVED_FIELDS: [&str; 7] = [
    "id",
    "status",
    "version",
    "assignee",
    "depends_on",
    "schema",
    "updated",
];

/// Returns whether `key` is managed by typed accessors.
#[must_use]
pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// A single work item persisted as one markdown file.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    id: TaskId,
    status: Option<TaskStatus>,
    version: Version,
    assignee: Option<CallerId>,
    depends_on: Vec<TaskId>,
    schema: u32,
    updated_at: Option<DateTime<Utc>>,
    extra_fields: Mapping,
    field_order: Vec<String>,
    document: TaskDocument,
    source_path: Option<Utf8PathBuf>,
}

/// Parameter object for reconstructing a decoded task record.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecordParts {
    /// Record identifier.
    pub id: TaskId,
    /// Current status, if any.
    pub status: Option<TaskStatus>,
    /// Current version.
    pub version: Version,
    /// Assigned caller, if any.
    pub assignee: Option<CallerId>,
    /// Prerequisite record identifiers in declaration order.
    pub depends_on: Vec<TaskId>,
    /// Schema marker.
    pub schema: u32,
    /// Timestamp of the latest accepted write.
    pub updated_at: Option<DateTime<Utc>>,
    /// Pass-through front-matter fields in their original order.
    pub extra_fields: Mapping,
    /// Front-matter keys in the order they were read.
    pub field_order: Vec<String>,
    /// Markdown body.
    pub document: TaskDocument,
    /// File the record was read from.
    pub source_path: Option<Utf8PathBuf>,
}

impl TaskRecord {
    /// Creates a fresh record at [`Version::INITIAL`].
    #[must_use]
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            status: None,
            version: Version::INITIAL,
            assignee: None,
            depends_on: Vec::new(),
            schema: CURRENT_SCHEMA,
            updated_at: None,
            extra_fields: Mapping::new(),
            field_order: Vec::new(),
            document: TaskDocument::default(),
            source_path: None,
        }
    }

    /// Reconstructs a record from decoded parts.
    #[must_use]
    pub fn from_parts(parts: TaskRecordParts) -> Self {
        Self {
            id: parts.id,
            status: parts.status,
            version: parts.version,
            assignee: parts.assignee,
            depends_on: parts.depends_on,
            schema: parts.schema,
            updated_at: parts.updated_at,
            extra_fields: parts.extra_fields,
            field_order: parts.field_order,
            document: parts.document,
            source_path: parts.source_path,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> Option<&TaskStatus> {
        self.status.as_ref()
    }

    /// Returns the current version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the assigned caller.
    #[must_use]
    pub const fn assignee(&self) -> Option<&CallerId> {
        self.assignee.as_ref()
    }

    /// Returns prerequisite record identifiers.
    #[must_use]
    pub fn depends_on(&self) -> &[TaskId] {
        &self.depends_on
    }

    /// Returns the schema marker.
    #[must_use]
    pub const fn schema(&self) -> u32 {
        self.schema
    }

    /// Returns the timestamp of the latest accepted write.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns pass-through front-matter fields.
    #[must_use]
    pub const fn extra_fields(&self) -> &Mapping {
        &self.extra_fields
    }

    /// Returns a pass-through field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra_fields.get(key)
    }

    /// Returns front-matter keys in the order they were read.
    #[must_use]
    pub fn field_order(&self) -> &[String] {
        &self.field_order
    }

    /// Returns the markdown body.
    #[must_use]
    pub const fn document(&self) -> &TaskDocument {
        &self.document
    }

    /// Returns the markdown body for editing.
    pub const fn document_mut(&mut self) -> &mut TaskDocument {
        &mut self.document
    }

    /// Returns the file the record was read from.
    #[must_use]
    pub fn source_path(&self) -> Option<&Utf8Path> {
        self.source_path.as_deref()
    }

    /// Records the file backing this record.
    pub fn set_source_path(&mut self, path: Utf8PathBuf) {
        self.source_path = Some(path);
    }

    /// Sets the status. Transition rules are enforced by the lifecycle
    /// service, not here.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = Some(status);
    }

    /// Sets or clears the assignee.
    pub fn set_assignee(&mut self, assignee: Option<CallerId>) {
        self.assignee = assignee;
    }

    /// Replaces the prerequisite list, dropping repeated ids.
    pub fn set_depends_on(&mut self, depends_on: impl IntoIterator<Item = TaskId>) {
        let mut unique: Vec<TaskId> = Vec::new();
        for id in depends_on {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.depends_on = unique;
    }

    /// Sets a pass-through field, keeping its position when it exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ReservedField`] for keys backed by typed
    /// fields and [`TaskDomainError::EmptyFieldKey`] for blank keys.
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<(), TaskDomainError> {
        if key.trim().is_empty() {
            return Err(TaskDomainError::EmptyFieldKey);
        }
        if is_reserved_field(key) {
            return Err(TaskDomainError::ReservedField(key.to_owned()));
        }
        self.extra_fields.insert(Value::String(key.to_owned()), value);
        Ok(())
    }

    /// Removes a pass-through field, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ReservedField`] for keys backed by typed
    /// fields.
    pub fn remove_field(&mut self, key: &str) -> Result<Option<Value>, TaskDomainError> {
        if is_reserved_field(key) {
            return Err(TaskDomainError::ReservedField(key.to_owned()));
        }
        let mut removed = None;
        self.extra_fields = std::mem::take(&mut self.extra_fields)
            .into_iter()
            .filter_map(|(existing_key, value)| {
                if existing_key.as_str() == Some(key) {
                    removed = Some(value);
                    None
                } else {
                    Some((existing_key, value))
                }
            })
            .collect();
        Ok(removed)
    }

    /// Advances the version by one and stamps the update time, replacing any
    /// unreadable timestamp carried over from the file.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::VersionOverflow`] when the counter is
    /// exhausted.
    pub fn advance_version(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.version = self.version.next()?;
        self.updated_at = Some(clock.utc());
        self.extra_fields.shift_remove("updated");
        Ok(())
    }
}
