//! Caller resolvers.
//!
//! Resolution order for [`EnvCallerResolver`]: the caller declared on the
//! request, then the agent name, then [`CALLER_ENV`].

use crate::task::{
    domain::{CallerContext, CallerId},
    ports::CallerResolver,
};

/// Environment variable naming the default caller.
pub const CALLER_ENV: &str = "DOSSIER_CALLER";

/// Resolves every request to one fixed caller, or to nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCallerResolver {
    caller: Option<CallerId>,
}

impl StaticCallerResolver {
    /// Resolves every request to `caller`.
    #[must_use]
    pub const fn new(caller: CallerId) -> Self {
        Self {
            caller: Some(caller),
        }
    }

    /// Resolves every request as unidentified.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { caller: None }
    }
}

impl CallerResolver for StaticCallerResolver {
    fn resolve(&self, _context: &CallerContext) -> Option<CallerId> {
        self.caller.clone()
    }
}

/// Resolves the request's declared caller or agent, falling back to a
/// default read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvCallerResolver {
    fallback: Option<CallerId>,
}

impl EnvCallerResolver {
    /// Reads the fallback caller from [`CALLER_ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_fallback(std::env::var(CALLER_ENV).ok().as_deref())
    }

    /// Uses `fallback` as the default caller. Blank values mean none.
    #[must_use]
    pub fn with_fallback(fallback: Option<&str>) -> Self {
        Self {
            fallback: fallback.and_then(|raw| CallerId::new(raw).ok()),
        }
    }
}

impl CallerResolver for EnvCallerResolver {
    fn resolve(&self, context: &CallerContext) -> Option<CallerId> {
        [context.declared.as_deref(), context.agent.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|raw| CallerId::new(raw).ok())
            .or_else(|| self.fallback.clone())
    }
}
