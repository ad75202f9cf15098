//! Then steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use dossier::task::{
    domain::{TaskId, TaskRecord},
    policy::GateError,
    services::{TaskLifecycleError, TaskLifecycleResult},
};
use rstest_bdd_macros::then;

fn last_result(world: &LifecycleWorld) -> Result<&TaskLifecycleResult<TaskRecord>, eyre::Report> {
    world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no mutation was attempted in this scenario"))
}

#[then("the mutation succeeds")]
fn mutation_succeeds(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match last_result(world)? {
        Ok(_) => Ok(()),
        Err(err) => Err(eyre::eyre!("expected success, got {err}")),
    }
}

#[then(r#"the mutation fails with code "{code}""#)]
fn mutation_fails_with(world: &LifecycleWorld, code: String) -> Result<(), eyre::Report> {
    match last_result(world)? {
        Err(err) if err.code().as_str() == code => Ok(()),
        Err(err) => Err(eyre::eyre!("expected {code}, got {}: {err}", err.code())),
        Ok(record) => Err(eyre::eyre!("expected {code}, but {} was updated", record.id())),
    }
}

#[then(r#"task "{id}" is in status "{status}" at version {version:u64}"#)]
fn task_is_in_status(
    world: &LifecycleWorld,
    id: String,
    status: String,
    version: u64,
) -> Result<(), eyre::Report> {
    let record = run_async(world.service.get(&TaskId::new(id)?))?;
    let actual = record.status().map(|value| value.as_str().to_owned());
    eyre::ensure!(
        actual.as_deref() == Some(status.as_str()),
        "expected status {status}, found {actual:?}"
    );
    eyre::ensure!(
        record.version().value() == version,
        "expected version {version}, found {}",
        record.version()
    );
    Ok(())
}

#[then(r#"the unmet prerequisites are "{ids}""#)]
fn unmet_prerequisites_are(world: &LifecycleWorld, ids: String) -> Result<(), eyre::Report> {
    let expected: Vec<&str> = ids.split(',').map(str::trim).collect();
    match last_result(world)? {
        Err(TaskLifecycleError::Gate(GateError::DependenciesUnmet { unmet, .. })) => {
            let actual: Vec<&str> = unmet.iter().map(TaskId::as_str).collect();
            eyre::ensure!(actual == expected, "expected {expected:?}, found {actual:?}");
            Ok(())
        }
        other => Err(eyre::eyre!("expected unmet dependencies, got {other:?}")),
    }
}

#[then(r#"the file for "{id}" is unchanged"#)]
fn file_is_unchanged(world: &LifecycleWorld, id: String) -> Result<(), eyre::Report> {
    let (file_name, before) = world
        .snapshot
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no snapshot was taken for {id}"))?;
    let (current_name, after) = world.record_bytes(&id)?;
    eyre::ensure!(&current_name == file_name, "record moved to {current_name}");
    eyre::ensure!(&after == before, "record {id} was rewritten");
    Ok(())
}

#[then("the audit log holds {count:usize} entries")]
fn audit_log_holds(world: &LifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let entries = world.audit_entries()?;
    eyre::ensure!(
        entries.len() == count,
        "expected {count} audit entries, found {}",
        entries.len()
    );
    Ok(())
}
