//! Request payloads for lifecycle mutations.
//!
//! Every mutation names the record, the version the caller last read, and
//! the caller context used for identity resolution.

use crate::task::domain::{CallerContext, CallerId, TaskId, TaskStatus, Version};
use serde_yaml::Value;

/// Moves a record to another status.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTaskRequest {
    pub(super) task_id: TaskId,
    pub(super) target: TaskStatus,
    pub(super) expected_version: Version,
    pub(super) force: bool,
    pub(super) caller: CallerContext,
}

impl TransitionTaskRequest {
    /// Creates a request to move `task_id` to `target`.
    #[must_use]
    pub fn new(task_id: TaskId, target: TaskStatus, expected_version: Version) -> Self {
        Self {
            task_id,
            target,
            expected_version,
            force: false,
            caller: CallerContext::anonymous(),
        }
    }

    /// Asks to bypass the transition graph. Only honoured for maintainers.
    #[must_use]
    pub const fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Sets the caller context.
    #[must_use]
    pub fn with_caller(mut self, caller: CallerContext) -> Self {
        self.caller = caller;
        self
    }
}

/// Changes typed and pass-through front-matter fields.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTaskFieldsRequest {
    pub(super) task_id: TaskId,
    pub(super) expected_version: Version,
    pub(super) caller: CallerContext,
    pub(super) assignee: Option<Option<CallerId>>,
    pub(super) depends_on: Option<Vec<TaskId>>,
    pub(super) set_fields: Vec<(String, Value)>,
    pub(super) remove_fields: Vec<String>,
}

impl UpdateTaskFieldsRequest {
    /// Creates an empty update for `task_id`.
    #[must_use]
    pub fn new(task_id: TaskId, expected_version: Version) -> Self {
        Self {
            task_id,
            expected_version,
            caller: CallerContext::anonymous(),
            assignee: None,
            depends_on: None,
            set_fields: Vec::new(),
            remove_fields: Vec::new(),
        }
    }

    /// Sets the caller context.
    #[must_use]
    pub fn with_caller(mut self, caller: CallerContext) -> Self {
        self.caller = caller;
        self
    }

    /// Assigns the record.
    #[must_use]
    pub fn assign(mut self, assignee: CallerId) -> Self {
        self.assignee = Some(Some(assignee));
        self
    }

    /// Clears the assignee.
    #[must_use]
    pub fn unassign(mut self) -> Self {
        self.assignee = Some(None);
        self
    }

    /// Replaces the prerequisite list.
    #[must_use]
    pub fn with_depends_on(mut self, depends_on: impl IntoIterator<Item = TaskId>) -> Self {
        self.depends_on = Some(depends_on.into_iter().collect());
        self
    }

    /// Sets a pass-through field.
    #[must_use]
    pub fn set_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_fields.push((key.into(), value.into()));
        self
    }

    /// Removes a pass-through field.
    #[must_use]
    pub fn remove_field(mut self, key: impl Into<String>) -> Self {
        self.remove_fields.push(key.into());
        self
    }

    pub(super) fn is_empty(&self) -> bool {
        self.assignee.is_none()
            && self.depends_on.is_none()
            && self.set_fields.is_empty()
            && self.remove_fields.is_empty()
    }
}

/// How a section body is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionWriteMode {
    /// Replace the section body, or add the section.
    #[default]
    Replace,
    /// Append to the section body, or add the section.
    Append,
}

/// Which authorization check guards a section write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionAccess {
    /// Assignee or maintainer.
    #[default]
    Standard,
    /// Assignee or maintainer, and the record must be in progress.
    Coding,
}

/// Writes one H2 section of a record's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSectionRequest {
    pub(super) task_id: TaskId,
    pub(super) expected_version: Version,
    pub(super) caller: CallerContext,
    pub(super) heading: String,
    pub(super) body: String,
    pub(super) mode: SectionWriteMode,
    pub(super) access: SectionAccess,
}

impl WriteSectionRequest {
    /// Creates a request replacing the body of `heading`.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        expected_version: Version,
        heading: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            expected_version,
            caller: CallerContext::anonymous(),
            heading: heading.into(),
            body: body.into(),
            mode: SectionWriteMode::Replace,
            access: SectionAccess::Standard,
        }
    }

    /// Sets the caller context.
    #[must_use]
    pub fn with_caller(mut self, caller: CallerContext) -> Self {
        self.caller = caller;
        self
    }

    /// Sets the write mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: SectionWriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the authorization check.
    #[must_use]
    pub const fn with_access(mut self, access: SectionAccess) -> Self {
        self.access = access;
        self
    }
}
