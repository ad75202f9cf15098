//! Unit tests for the transition, dependency, and authorization gates.

use super::support::{caller, delivery_config, record, status, task_id};
use crate::task::{
    adapters::memory::InMemoryTaskStore,
    codec::CodecError,
    domain::{ErrorCode, TaskStatus, WorkflowConfig},
    policy::{
        AuthorizationGate, DependencyGate, DependencyVerdict, GateError, TransitionCheck,
        TransitionDecision, TransitionGate, TransitionRejection,
    },
    ports::TaskStore,
};
use eyre::{bail, ensure};
use rstest::{fixture, rstest};

#[fixture]
fn config() -> WorkflowConfig {
    delivery_config()
}

fn check_transition(
    config: &WorkflowConfig,
    from: Option<&str>,
    to: &str,
    force: bool,
    maintainer: bool,
) -> Result<TransitionDecision, GateError> {
    let id = task_id("task-001");
    let from_status = from.map(status);
    let to_status = status(to);
    TransitionGate::check(
        config,
        TransitionCheck {
            task_id: &id,
            from: from_status.as_ref(),
            to: &to_status,
            force,
            caller_is_maintainer: maintainer,
        },
    )
}

#[rstest]
#[case(Some("Backlog"), "Ready", TransitionDecision::Allowed)]
#[case(Some("Ready"), "Backlog", TransitionDecision::Allowed)]
#[case(Some("Review"), "InProgress", TransitionDecision::Allowed)]
fn graph_transitions_are_allowed(
    config: WorkflowConfig,
    #[case] from: Option<&str>,
    #[case] to: &str,
    #[case] expected: TransitionDecision,
) -> eyre::Result<()> {
    ensure!(check_transition(&config, from, to, false, false)? == expected);
    Ok(())
}

#[rstest]
#[case(Some("Backlog"), "InProgress", false, TransitionRejection::NotAllowed)]
#[case(Some("Backlog"), "Done", false, TransitionRejection::NotAllowed)]
#[case(Some("Done"), "Backlog", false, TransitionRejection::NoOutgoingTransitions)]
#[case(Some("Done"), "Backlog", true, TransitionRejection::NoOutgoingTransitions)]
#[case(None, "Ready", false, TransitionRejection::NoOutgoingTransitions)]
#[case(None, "Done", false, TransitionRejection::NoOutgoingTransitions)]
#[case(Some("Backlog"), "Archived", false, TransitionRejection::UnknownTarget)]
fn graph_violations_are_rejected(
    config: WorkflowConfig,
    #[case] from: Option<&str>,
    #[case] to: &str,
    #[case] force: bool,
    #[case] expected: TransitionRejection,
) -> eyre::Result<()> {
    match check_transition(&config, from, to, force, false) {
        Err(err @ GateError::InvalidTransition { reason, .. }) => {
            ensure!(reason == expected);
            ensure!(err.code() == ErrorCode::InvalidTransition);
            Ok(())
        }
        other => bail!("expected invalid transition, got {other:?}"),
    }
}

#[rstest]
#[case(Some("Done"), "Backlog")]
#[case(None, "Ready")]
fn maintainers_can_force_past_the_graph(
    config: WorkflowConfig,
    #[case] from: Option<&str>,
    #[case] to: &str,
) -> eyre::Result<()> {
    let decision = check_transition(&config, from, to, true, true)?;
    ensure!(decision == TransitionDecision::Forced);
    Ok(())
}

#[rstest]
fn forcing_never_admits_unknown_statuses(config: WorkflowConfig) {
    let result = check_transition(&config, Some("Done"), "Archived", true, true);
    assert!(matches!(
        result,
        Err(GateError::InvalidTransition {
            reason: TransitionRejection::UnknownTarget,
            ..
        })
    ));
}

#[rstest]
fn empty_graph_is_permissive() -> eyre::Result<()> {
    let config = WorkflowConfig::default();
    let decision = check_transition(&config, Some("Whatever"), "Anything", false, false)?;
    ensure!(decision == TransitionDecision::Unrestricted);
    Ok(())
}

async fn seeded_store() -> eyre::Result<InMemoryTaskStore> {
    let store = InMemoryTaskStore::new();
    store.create(&record("task-001", "Done", None)).await?;
    store.create(&record("task-002", "Review", None)).await?;
    store.insert_unreadable(
        task_id("task-003"),
        CodecError::Parse {
            location: "task-003.md".to_owned(),
            message: "front-matter block is not terminated by '---'".to_owned(),
        },
    )?;
    Ok(store)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependency_gate_lists_every_unmet_prerequisite(config: WorkflowConfig) -> eyre::Result<()> {
    let store = seeded_store().await?;
    let mut dependent = record("task-010", "Ready", Some("alice"));
    dependent.set_depends_on([
        task_id("task-001"),
        task_id("task-002"),
        task_id("task-003"),
        task_id("task-404"),
    ]);

    let verdict =
        DependencyGate::evaluate(&config, &dependent, &status("InProgress"), &store).await?;
    let expected = vec![task_id("task-002"), task_id("task-003"), task_id("task-404")];
    ensure!(verdict == DependencyVerdict::Unmet(expected.clone()));

    match verdict.into_result(dependent.id()) {
        Err(GateError::DependenciesUnmet { unmet, .. }) => ensure!(unmet == expected),
        other => bail!("expected unmet dependencies, got {other:?}"),
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependency_gate_passes_when_all_prerequisites_are_done(
    config: WorkflowConfig,
) -> eyre::Result<()> {
    let store = seeded_store().await?;
    let mut dependent = record("task-011", "Ready", None);
    dependent.set_depends_on([task_id("task-001")]);

    let verdict =
        DependencyGate::evaluate(&config, &dependent, &status("InProgress"), &store).await?;
    ensure!(verdict == DependencyVerdict::Satisfied);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependency_gate_ignores_targets_outside_the_in_progress_set(
    config: WorkflowConfig,
) -> eyre::Result<()> {
    let store = seeded_store().await?;
    let mut dependent = record("task-012", "Backlog", None);
    dependent.set_depends_on([task_id("task-404")]);

    let verdict = DependencyGate::evaluate(&config, &dependent, &status("Ready"), &store).await?;
    ensure!(verdict == DependencyVerdict::NotApplicable);
    Ok(())
}

#[rstest]
#[case::assignee("alice", true, false)]
#[case::maintainer("lead", false, true)]
fn assignees_and_maintainers_are_authorized(
    config: WorkflowConfig,
    #[case] who: &str,
    #[case] is_assignee: bool,
    #[case] is_maintainer: bool,
) -> eyre::Result<()> {
    let target = record("task-001", "Backlog", Some("alice"));
    let authorization = AuthorizationGate::new().authorize(Some(caller(who)), &target, &config)?;
    ensure!(authorization.caller == caller(who));
    ensure!(authorization.is_assignee == is_assignee);
    ensure!(authorization.is_maintainer == is_maintainer);
    Ok(())
}

#[rstest]
#[case::stranger(Some("mallory"))]
#[case::unidentified(None)]
fn other_callers_are_unauthorized(config: WorkflowConfig, #[case] who: Option<&str>) {
    let target = record("task-001", "Backlog", Some("alice"));
    let result = AuthorizationGate::new().authorize(who.map(caller), &target, &config);
    assert!(matches!(result, Err(GateError::Unauthorized { .. })));
    assert_eq!(
        result.map_err(|err| err.code()).err(),
        Some(ErrorCode::Unauthorized)
    );
}

#[rstest]
fn trust_local_treats_unidentified_callers_as_first_maintainer(
    config: WorkflowConfig,
) -> eyre::Result<()> {
    let target = record("task-001", "Backlog", None);
    let authorization = AuthorizationGate::trusting_local().authorize(None, &target, &config)?;
    ensure!(authorization.caller == caller("lead"));
    ensure!(authorization.is_maintainer);
    Ok(())
}

#[rstest]
fn trust_local_without_maintainers_still_rejects() {
    let target = record("task-001", "Backlog", None);
    let result =
        AuthorizationGate::trusting_local().authorize(None, &target, &WorkflowConfig::default());
    assert!(matches!(
        result,
        Err(GateError::Unauthorized { caller: None, .. })
    ));
}

#[rstest]
#[case(Some("1"), true)]
#[case(Some("TRUE"), true)]
#[case(Some(" yes "), true)]
#[case(Some("0"), false)]
#[case(Some(""), false)]
#[case(None, false)]
fn trust_local_switch_values(#[case] raw: Option<&str>, #[case] enabled: bool) {
    assert_eq!(AuthorizationGate::from_env_value(raw).trusts_local(), enabled);
}

#[rstest]
fn coding_requires_an_in_progress_status(config: WorkflowConfig) -> eyre::Result<()> {
    let gate = AuthorizationGate::new();
    let active = record("task-001", "InProgress", Some("alice"));
    ensure!(
        gate.authorize_coding(Some(caller("alice")), &active, &config)
            .is_ok()
    );

    let waiting = record("task-002", "Ready", Some("alice"));
    match gate.authorize_coding(Some(caller("alice")), &waiting, &config) {
        Err(GateError::GateViolation { status, .. }) => {
            ensure!(status.as_ref().map(TaskStatus::as_str) == Some("Ready"));
        }
        other => bail!("expected gate violation, got {other:?}"),
    }

    let result = gate.authorize_coding(Some(caller("mallory")), &active, &config);
    ensure!(matches!(result, Err(GateError::Unauthorized { .. })));
    Ok(())
}
