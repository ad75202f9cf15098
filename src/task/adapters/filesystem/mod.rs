//! Filesystem adapters: markdown record store, YAML workflow configuration,
//! and JSON-lines audit log.
//!
//! All paths hang off one base directory (see [`StoreLayout`]). Blocking
//! filesystem calls run on tokio's blocking pool.

mod audit;
mod blocking;
mod config;
mod layout;
mod lock;
mod store;

pub use audit::JsonLinesAuditSink;
pub use config::YamlWorkflowConfigProvider;
pub use layout::{AUDIT_FILE, COLLECTION_DIR, CONFIG_FILE, LOCK_SUFFIX, StoreLayout, lock_marker_name};
pub use store::MarkdownTaskStore;
