//! Given steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use dossier::task::{
    domain::{CallerContext, CallerId, TaskId, TaskRecord, TaskStatus, Version},
    ports::TaskStore,
    services::TransitionTaskRequest,
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

fn seed(
    world: &LifecycleWorld,
    id: &str,
    status: &str,
    assignee: &str,
    depends_on: Option<&str>,
) -> Result<(), eyre::Report> {
    let mut record = TaskRecord::new(TaskId::new(id)?);
    record.set_status(TaskStatus::new(status)?);
    record.set_assignee(Some(CallerId::new(assignee)?));
    if let Some(prerequisite) = depends_on {
        record.set_depends_on([TaskId::new(prerequisite)?]);
    }
    record.document_mut().title = Some(format!("Scenario task {id}"));
    run_async(world.store.create(&record)).wrap_err("seed scenario task")?;
    Ok(())
}

#[given(r#"a task "{id}" in status "{status}" assigned to "{assignee}""#)]
fn task_in_status(
    world: &mut LifecycleWorld,
    id: String,
    status: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    seed(world, &id, &status, &assignee, None)
}

#[given(r#"prerequisite "{prerequisite}" must be done before "{id}" starts"#)]
fn task_with_prerequisite(
    world: &mut LifecycleWorld,
    prerequisite: String,
    id: String,
) -> Result<(), eyre::Report> {
    seed(world, &id, "Ready", "alice", Some(&prerequisite))
}

#[given(r#""{caller}" has moved "{id}" to "{status}" at version {version:u64}"#)]
fn task_has_moved(
    world: &mut LifecycleWorld,
    caller: String,
    id: String,
    status: String,
    version: u64,
) -> Result<(), eyre::Report> {
    let request =
        TransitionTaskRequest::new(TaskId::new(id)?, TaskStatus::new(status)?, Version::new(version)?)
            .with_caller(CallerContext::declared(caller));
    run_async(world.service.transition(request)).wrap_err("transition in scenario setup")?;
    Ok(())
}

#[given(r#"another writer holds the lock on "{id}""#)]
fn another_writer_holds_lock(world: &mut LifecycleWorld, id: String) -> Result<(), eyre::Report> {
    world.snapshot = Some(world.record_bytes(&id)?);
    let held = run_async(world.store.acquire_lock(&TaskId::new(id)?))
        .wrap_err("take the lock for another writer")?;
    world.held_lock = Some(held);
    Ok(())
}
