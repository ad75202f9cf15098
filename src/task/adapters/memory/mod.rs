//! In-memory adapters for tests and embedding.

mod audit;
mod task;

pub use audit::InMemoryAuditSink;
pub use task::InMemoryTaskStore;
