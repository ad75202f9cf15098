//! Transition gate: is a status change allowed by the workflow graph?

use super::{GateError, TransitionRejection};
use crate::task::domain::{TaskId, TaskStatus, WorkflowConfig};

/// Inputs for a transition check.
#[derive(Debug, Clone, Copy)]
pub struct TransitionCheck<'a> {
    /// Record being moved.
    pub task_id: &'a TaskId,
    /// Current status.
    pub from: Option<&'a TaskStatus>,
    /// Requested status.
    pub to: &'a TaskStatus,
    /// Whether the caller asked to bypass the graph.
    pub force: bool,
    /// Whether the caller is a maintainer.
    pub caller_is_maintainer: bool,
}

/// How a permitted transition was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// The graph lists the target for the source status.
    Allowed,
    /// No graph is configured, so every configured status is reachable.
    Unrestricted,
    /// A maintainer bypassed the graph.
    Forced,
}

impl TransitionDecision {
    /// Returns the audit label of the decision.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Unrestricted => "unrestricted",
            Self::Forced => "forced",
        }
    }
}

/// Validates status changes against the configured transition graph.
///
/// An empty graph permits everything. In a non-empty graph a status with no
/// entry has no way out, and neither has a record without a status; only a
/// maintainer's forced transition moves such a record. Forcing never admits
/// a status that is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionGate;

impl TransitionGate {
    /// Checks one requested transition.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidTransition`] when the target is not a
    /// configured status or the graph does not allow the move.
    pub fn check(
        config: &WorkflowConfig,
        check: TransitionCheck<'_>,
    ) -> Result<TransitionDecision, GateError> {
        let reject = |reason: TransitionRejection| GateError::InvalidTransition {
            task_id: check.task_id.clone(),
            from: check.from.cloned(),
            to: check.to.clone(),
            reason,
        };

        if !config.is_known_status(check.to) {
            return Err(reject(TransitionRejection::UnknownTarget));
        }
        if check.force && check.caller_is_maintainer {
            tracing::warn!(
                task_id = %check.task_id,
                to = %check.to,
                "maintainer forced transition past the workflow graph"
            );
            return Ok(TransitionDecision::Forced);
        }
        if check.force {
            tracing::warn!(
                task_id = %check.task_id,
                "ignoring force flag from a caller who is not a maintainer"
            );
        }
        if !config.has_transition_graph() {
            return Ok(TransitionDecision::Unrestricted);
        }
        match check.from.and_then(|from| config.transitions_from(from)) {
            None => {
                tracing::warn!(
                    task_id = %check.task_id,
                    status = check.from.map(TaskStatus::as_str),
                    "status has no entry in the transition map; no transitions are allowed from it"
                );
                Err(reject(TransitionRejection::NoOutgoingTransitions))
            }
            Some(targets) if targets.contains(check.to) => Ok(TransitionDecision::Allowed),
            Some(_) => Err(reject(TransitionRejection::NotAllowed)),
        }
    }
}
