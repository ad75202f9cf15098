//! Workflow configuration snapshot: statuses, transitions, and roles.

use super::{CallerId, TaskDomainError, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Raw workflow settings as they appear in configuration files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Every valid status name.
    pub statuses: Vec<String>,
    /// Statuses considered active work.
    pub in_progress_statuses: Vec<String>,
    /// Allowed moves keyed by source status.
    pub transitions: BTreeMap<String, Vec<String>>,
    /// Callers with elevated privileges.
    pub maintainers: Vec<String>,
}

/// Errors raised while validating workflow settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowValidationError {
    /// A status or maintainer value is malformed.
    #[error(transparent)]
    InvalidValue(#[from] TaskDomainError),

    /// A status is referenced but not declared in `statuses`.
    #[error("status '{status}' referenced by {referenced_by} is not a declared status")]
    UnknownStatus {
        /// The undeclared status.
        status: String,
        /// Where the status was referenced.
        referenced_by: String,
    },
}

/// Validated, read-only workflow configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowConfig {
    statuses: Vec<TaskStatus>,
    in_progress_statuses: Vec<TaskStatus>,
    transitions: BTreeMap<TaskStatus, Vec<TaskStatus>>,
    maintainers: Vec<CallerId>,
}

impl WorkflowConfig {
    /// Validates raw settings.
    ///
    /// Every status named by `in_progress_statuses` or `transitions` must be
    /// declared in `statuses`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowValidationError::UnknownStatus`] for undeclared
    /// statuses and [`WorkflowValidationError::InvalidValue`] for blank
    /// names.
    pub fn new(settings: WorkflowSettings) -> Result<Self, WorkflowValidationError> {
        let statuses = dedup(
            settings
                .statuses
                .into_iter()
                .map(TaskStatus::new)
                .collect::<Result<Vec<_>, _>>()?,
        );

        let declared = |raw: String,
                        referenced_by: &str|
         -> Result<TaskStatus, WorkflowValidationError> {
            let status = TaskStatus::new(raw)?;
            if statuses.contains(&status) {
                Ok(status)
            } else {
                Err(WorkflowValidationError::UnknownStatus {
                    status: status.as_str().to_owned(),
                    referenced_by: referenced_by.to_owned(),
                })
            }
        };

        let in_progress_statuses = dedup(
            settings
                .in_progress_statuses
                .into_iter()
                .map(|raw| declared(raw, "in_progress_statuses"))
                .collect::<Result<Vec<_>, _>>()?,
        );

        let mut transitions = BTreeMap::new();
        for (from, targets) in settings.transitions {
            let source = declared(from, "transitions")?;
            let context = format!("transitions.{source}");
            let allowed = targets
                .into_iter()
                .map(|raw| declared(raw, &context))
                .collect::<Result<Vec<_>, _>>()?;
            transitions.insert(source, dedup(allowed));
        }

        let maintainers = dedup(
            settings
                .maintainers
                .into_iter()
                .map(CallerId::new)
                .collect::<Result<Vec<_>, _>>()?,
        );

        Ok(Self {
            statuses,
            in_progress_statuses,
            transitions,
            maintainers,
        })
    }

    /// Returns declared statuses in configuration order.
    #[must_use]
    pub fn statuses(&self) -> &[TaskStatus] {
        &self.statuses
    }

    /// Returns the in-progress subset.
    #[must_use]
    pub fn in_progress_statuses(&self) -> &[TaskStatus] {
        &self.in_progress_statuses
    }

    /// Returns configured maintainers.
    #[must_use]
    pub fn maintainers(&self) -> &[CallerId] {
        &self.maintainers
    }

    /// Returns whether `status` may be stored on a record.
    ///
    /// An empty status list places no restriction on status names.
    #[must_use]
    pub fn is_known_status(&self, status: &TaskStatus) -> bool {
        self.statuses.is_empty() || self.statuses.contains(status)
    }

    /// Returns whether `status` is in the in-progress set.
    #[must_use]
    pub fn is_in_progress(&self, status: &TaskStatus) -> bool {
        self.in_progress_statuses.contains(status)
    }

    /// Returns whether any transition rules are configured.
    #[must_use]
    pub fn has_transition_graph(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Returns the statuses reachable from `from`, or `None` when `from` has
    /// no entry in the transition map.
    #[must_use]
    pub fn transitions_from(&self, from: &TaskStatus) -> Option<&[TaskStatus]> {
        self.transitions.get(from).map(Vec::as_slice)
    }

    /// Returns whether `caller` is a maintainer.
    #[must_use]
    pub fn is_maintainer(&self, caller: &CallerId) -> bool {
        self.maintainers.contains(caller)
    }

    /// Returns the first configured maintainer.
    #[must_use]
    pub fn first_maintainer(&self) -> Option<&CallerId> {
        self.maintainers.first()
    }

    /// Returns declared statuses that have no entry in a non-empty transition
    /// map. Records in these statuses cannot move without a forced
    /// transition.
    #[must_use]
    pub fn dead_end_statuses(&self) -> Vec<&TaskStatus> {
        if self.transitions.is_empty() {
            return Vec::new();
        }
        self.statuses
            .iter()
            .filter(|status| !self.transitions.contains_key(*status))
            .collect()
    }
}

fn dedup<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}
