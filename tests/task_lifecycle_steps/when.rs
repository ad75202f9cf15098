//! When steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use dossier::task::{
    domain::{CallerContext, TaskId, TaskStatus, Version},
    services::TransitionTaskRequest,
};
use rstest_bdd_macros::when;

#[when(r#""{caller}" moves "{id}" to "{status}" at version {version:u64}"#)]
fn caller_moves_task(
    world: &mut LifecycleWorld,
    caller: String,
    id: String,
    status: String,
    version: u64,
) -> Result<(), eyre::Report> {
    let request =
        TransitionTaskRequest::new(TaskId::new(id)?, TaskStatus::new(status)?, Version::new(version)?)
            .with_caller(CallerContext::declared(caller));
    world.last_result = Some(run_async(world.service.transition(request)));
    Ok(())
}
