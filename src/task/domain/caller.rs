//! Request context used to work out who is calling.

/// Identity hints supplied by the front end with each request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    /// Caller id stated explicitly in the request.
    pub declared: Option<String>,
    /// Name of the agent session the request arrived on.
    pub agent: Option<String>,
}

impl CallerContext {
    /// Creates a context with no identity hints.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            declared: None,
            agent: None,
        }
    }

    /// Creates a context with an explicitly declared caller.
    #[must_use]
    pub fn declared(caller: impl Into<String>) -> Self {
        Self {
            declared: Some(caller.into()),
            agent: None,
        }
    }

    /// Sets the agent session name.
    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }
}
