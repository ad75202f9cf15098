//! Dependency gate: prerequisites must be done before work starts.

use super::GateError;
use crate::task::{
    domain::{TaskId, TaskRecord, TaskStatus, WorkflowConfig},
    ports::{TaskStore, TaskStoreResult},
};

/// Outcome of evaluating a record's prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyVerdict {
    /// The target status is not in the in-progress set.
    NotApplicable,
    /// Every prerequisite is done.
    Satisfied,
    /// These prerequisites are missing, unreadable, or not done.
    Unmet(Vec<TaskId>),
}

impl DependencyVerdict {
    /// Converts the verdict into a gate result for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::DependenciesUnmet`] for [`Self::Unmet`].
    pub fn into_result(self, task_id: &TaskId) -> Result<(), GateError> {
        match self {
            Self::NotApplicable | Self::Satisfied => Ok(()),
            Self::Unmet(unmet) => Err(GateError::DependenciesUnmet {
                task_id: task_id.clone(),
                unmet,
            }),
        }
    }
}

/// Blocks entry into in-progress statuses until every `depends_on` record
/// has status `"Done"`.
///
/// A prerequisite that cannot be found or parsed counts as unmet. The
/// `"Done"` sentinel is fixed and independent of configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyGate;

impl DependencyGate {
    /// Evaluates the prerequisites of `record` for a move to `target`.
    ///
    /// # Errors
    ///
    /// Propagates unexpected store failures such as I/O errors. Missing and
    /// unparsable prerequisites are reported in the verdict instead.
    pub async fn evaluate<S>(
        config: &WorkflowConfig,
        record: &TaskRecord,
        target: &TaskStatus,
        store: &S,
    ) -> TaskStoreResult<DependencyVerdict>
    where
        S: TaskStore + ?Sized,
    {
        if !config.is_in_progress(target) {
            return Ok(DependencyVerdict::NotApplicable);
        }

        let mut unmet = Vec::new();
        for dependency in record.depends_on() {
            let done = match store.load(dependency).await {
                Ok(prerequisite) => prerequisite.status().is_some_and(TaskStatus::is_done),
                Err(err) if err.is_unresolved_record() => {
                    tracing::debug!(
                        task_id = %record.id(),
                        dependency = %dependency,
                        error = %err,
                        "dependency could not be resolved; treating it as unmet"
                    );
                    false
                }
                Err(err) => return Err(err),
            };
            if !done {
                unmet.push(dependency.clone());
            }
        }

        if unmet.is_empty() {
            Ok(DependencyVerdict::Satisfied)
        } else {
            Ok(DependencyVerdict::Unmet(unmet))
        }
    }
}
