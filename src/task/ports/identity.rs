//! Caller identity resolution port.

use crate::task::domain::{CallerContext, CallerId};

/// Works out who issued a request.
pub trait CallerResolver: Send + Sync {
    /// Returns the caller, or `None` when the request is unidentified.
    fn resolve(&self, context: &CallerContext) -> Option<CallerId>;
}
