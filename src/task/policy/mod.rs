//! Workflow gates every mutation must pass.
//!
//! - [`AuthorizationGate`]: the caller is the assignee or a maintainer.
//! - [`TransitionGate`]: the status change is allowed by the graph.
//! - [`DependencyGate`]: prerequisites are done before work starts.

mod authorization;
mod dependency;
mod error;
mod transition;

pub use authorization::{Authorization, AuthorizationGate, TRUST_LOCAL_ENV};
pub use dependency::{DependencyGate, DependencyVerdict};
pub use error::{GateError, TransitionRejection};
pub use transition::{TransitionCheck, TransitionDecision, TransitionGate};
