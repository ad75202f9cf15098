//! Authorization gate: only the assignee or a maintainer may mutate.

use super::GateError;
use crate::task::domain::{CallerId, TaskRecord, WorkflowConfig};

/// Environment variable that enables trust-local mode.
pub const TRUST_LOCAL_ENV: &str = "DOSSIER_TRUST_LOCAL";

/// A caller that passed the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// The effective caller.
    pub caller: CallerId,
    /// Whether the caller is a configured maintainer.
    pub is_maintainer: bool,
    /// Whether the caller is the record's assignee.
    pub is_assignee: bool,
}

/// Restricts mutation to a record's assignee or a maintainer.
///
/// Trust-local mode, meant for single-user development and off by default,
/// treats an unidentified caller as the first configured maintainer. It is
/// enabled out-of-band, never through the workflow configuration that
/// agents can edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorizationGate {
    trust_local: bool,
}

impl AuthorizationGate {
    /// Creates a gate with trust-local disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self { trust_local: false }
    }

    /// Creates a gate with trust-local enabled.
    #[must_use]
    pub const fn trusting_local() -> Self {
        Self { trust_local: true }
    }

    /// Creates a gate configured from [`TRUST_LOCAL_ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(TRUST_LOCAL_ENV).ok().as_deref())
    }

    /// Creates a gate from the raw value of [`TRUST_LOCAL_ENV`]. `1`, `true`,
    /// and `yes` (any case) enable trust-local.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        let enabled = value.is_some_and(|raw| {
            matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            )
        });
        Self {
            trust_local: enabled,
        }
    }

    /// Returns whether trust-local is enabled.
    #[must_use]
    pub const fn trusts_local(self) -> bool {
        self.trust_local
    }

    /// Returns the caller the gate will evaluate: the resolved caller, or the
    /// first maintainer under trust-local when the caller is unidentified.
    #[must_use]
    pub fn effective_caller(
        self,
        caller: Option<CallerId>,
        config: &WorkflowConfig,
    ) -> Option<CallerId> {
        match caller {
            Some(id) => Some(id),
            None if self.trust_local => config.first_maintainer().cloned(),
            None => None,
        }
    }

    /// Checks that `caller` may mutate `record`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Unauthorized`] when the caller is unidentified or
    /// is neither the assignee nor a maintainer.
    pub fn authorize(
        self,
        caller: Option<CallerId>,
        record: &TaskRecord,
        config: &WorkflowConfig,
    ) -> Result<Authorization, GateError> {
        let Some(effective) = self.effective_caller(caller, config) else {
            return Err(GateError::Unauthorized {
                task_id: record.id().clone(),
                caller: None,
            });
        };

        let is_maintainer = config.is_maintainer(&effective);
        let is_assignee = record.assignee() == Some(&effective);
        if !is_maintainer && !is_assignee {
            return Err(GateError::Unauthorized {
                task_id: record.id().clone(),
                caller: Some(effective),
            });
        }

        Ok(Authorization {
            caller: effective,
            is_maintainer,
            is_assignee,
        })
    }

    /// Checks authorization for coding operations: the caller must pass
    /// [`Self::authorize`] and the record must already be in progress.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Unauthorized`] when the caller check fails and
    /// [`GateError::GateViolation`] when the record is not in progress.
    pub fn authorize_coding(
        self,
        caller: Option<CallerId>,
        record: &TaskRecord,
        config: &WorkflowConfig,
    ) -> Result<Authorization, GateError> {
        let authorization = self.authorize(caller, record, config)?;
        let in_progress = record
            .status()
            .is_some_and(|status| config.is_in_progress(status));
        if !in_progress {
            return Err(GateError::GateViolation {
                task_id: record.id().clone(),
                status: record.status().cloned(),
            });
        }
        Ok(authorization)
    }
}
