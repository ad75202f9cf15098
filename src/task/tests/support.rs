//! Shared fixtures for task unit tests.

use crate::task::domain::{
    CallerId, TaskId, TaskRecord, TaskStatus, WorkflowConfig, WorkflowSettings,
};
use std::collections::BTreeMap;

pub(super) fn task_id(raw: &str) -> TaskId {
    TaskId::new(raw).expect("valid task id")
}

pub(super) fn status(raw: &str) -> TaskStatus {
    TaskStatus::new(raw).expect("valid status")
}

pub(super) fn caller(raw: &str) -> CallerId {
    CallerId::new(raw).expect("valid caller id")
}

/// `Backlog -> Ready -> InProgress -> Review -> Done`, with `Done` as a dead
/// end and `lead` as the only maintainer.
pub(super) fn delivery_settings() -> WorkflowSettings {
    let transitions: BTreeMap<String, Vec<String>> = [
        ("Backlog", vec!["Ready"]),
        ("Ready", vec!["InProgress", "Backlog"]),
        ("InProgress", vec!["Review"]),
        ("Review", vec!["Done", "InProgress"]),
    ]
    .into_iter()
    .map(|(from, targets)| {
        (
            from.to_owned(),
            targets.into_iter().map(str::to_owned).collect(),
        )
    })
    .collect();

    WorkflowSettings {
        statuses: ["Backlog", "Ready", "InProgress", "Review", "Done"]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        in_progress_statuses: vec!["InProgress".to_owned()],
        transitions,
        maintainers: vec!["lead".to_owned()],
    }
}

pub(super) fn delivery_config() -> WorkflowConfig {
    WorkflowConfig::new(delivery_settings()).expect("delivery workflow is valid")
}

pub(super) fn record(id: &str, state: &str, assignee: Option<&str>) -> TaskRecord {
    let mut built = TaskRecord::new(task_id(id));
    built.set_status(status(state));
    built.set_assignee(assignee.map(caller));
    built.document_mut().title = Some(format!("Task {id}"));
    built
}
