//! Port contracts for the task lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by task services:
//! record storage and locking, workflow configuration, caller identity, and
//! auditing.

pub mod audit;
pub mod config;
pub mod identity;
pub mod store;

pub use audit::{AuditSink, AuditSinkError};
pub use config::{WorkflowConfigError, WorkflowConfigProvider};
pub use identity::CallerResolver;
pub use store::{ListedTask, RecordLock, TaskStore, TaskStoreError, TaskStoreResult};
