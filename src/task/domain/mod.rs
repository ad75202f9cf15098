//! Domain model for task records and their workflow.
//!
//! The task domain models records, their markdown documents, the workflow
//! configuration snapshot, and audit entries while keeping filesystem and
//! serialization concerns outside of the domain boundary.

mod audit;
mod caller;
mod document;
mod error;
mod ids;
mod task;
mod version;
mod workflow;

pub use audit::{AuditEntry, AuditOperation};
pub use caller::CallerContext;
pub(crate) use document::{is_fence, normalize_body, section_heading};
pub use document::{Section, Sections, TaskDocument};
pub use error::{ErrorCode, TaskDomainError};
pub use ids::{CallerId, TaskId, TaskStatus};
pub use task::{CURRENT_SCHEMA, RESERVED_FIELDS, TaskRecord, TaskRecordParts, is_reserved_field};
pub use version::Version;
pub use workflow::{WorkflowConfig, WorkflowSettings, WorkflowValidationError};
