//! Errors raised by the workflow gates.

use crate::task::domain::{CallerId, ErrorCode, TaskId, TaskStatus};
use std::fmt;
use thiserror::Error;

/// Why a status change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejection {
    /// The target is not a configured status.
    UnknownTarget,
    /// The source status, or the lack of one, has no entry in the
    /// transition map, so nothing
    /// leaves it. Often a configuration gap rather than a deliberate
    /// terminal state.
    NoOutgoingTransitions,
    /// The source status has an entry that does not list the target.
    NotAllowed,
}

impl TransitionRejection {
    /// Returns a short description.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownTarget => "target status is not configured",
            Self::NoOutgoingTransitions => "source status has no configured transitions",
            Self::NotAllowed => "target is not listed for the source status",
        }
    }
}

impl fmt::Display for TransitionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the transition, dependency, and authorization gates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// The requested status change is not permitted.
    #[error("task {task_id} cannot move from {} to {to}: {reason}", status_label(.from.as_ref()))]
    InvalidTransition {
        /// Record identifier.
        task_id: TaskId,
        /// Current status.
        from: Option<TaskStatus>,
        /// Requested status.
        to: TaskStatus,
        /// Which rule refused the change.
        reason: TransitionRejection,
    },

    /// Prerequisite records are missing, unreadable, or not done.
    #[error("task {task_id} has unmet dependencies: {}", join_ids(.unmet))]
    DependenciesUnmet {
        /// Record identifier.
        task_id: TaskId,
        /// Every unmet prerequisite, in declaration order.
        unmet: Vec<TaskId>,
    },

    /// The caller is neither the assignee nor a maintainer.
    #[error("{} may not modify task {task_id}", caller_label(.caller.as_ref()))]
    Unauthorized {
        /// Record identifier.
        task_id: TaskId,
        /// Resolved caller, if any.
        caller: Option<CallerId>,
    },

    /// The record is not in a status that permits the operation.
    #[error("task {task_id} must be in progress for this operation (status: {})", status_label(.status.as_ref()))]
    GateViolation {
        /// Record identifier.
        task_id: TaskId,
        /// Current status.
        status: Option<TaskStatus>,
    },
}

impl GateError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            Self::DependenciesUnmet { .. } => ErrorCode::DependenciesUnmet,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::GateViolation { .. } => ErrorCode::GateViolation,
        }
    }
}

fn status_label(status: Option<&TaskStatus>) -> String {
    status.map_or_else(|| "(no status)".to_owned(), ToString::to_string)
}

fn caller_label(caller: Option<&CallerId>) -> String {
    caller.map_or_else(|| "unidentified caller".to_owned(), |id| format!("caller '{id}'"))
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
