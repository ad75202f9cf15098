//! On-disk layout of a dossier base directory.

use camino::{Utf8Path, Utf8PathBuf};

/// Directory holding record files, relative to the base directory.
pub const COLLECTION_DIR: &str = "tasks";

/// Workflow configuration file, relative to the base directory.
pub const CONFIG_FILE: &str = "workflow.yaml";

/// Audit log file, relative to the base directory.
pub const AUDIT_FILE: &str = "audit.jsonl";

/// Suffix appended to a record file name to form its lock marker.
pub const LOCK_SUFFIX: &str = ".lock";

/// Paths derived from a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    base_dir: Utf8PathBuf,
}

impl StoreLayout {
    /// Creates a layout rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    /// Returns the record collection directory.
    #[must_use]
    pub fn collection_dir(&self) -> Utf8PathBuf {
        self.base_dir.join(COLLECTION_DIR)
    }

    /// Returns the workflow configuration file path.
    #[must_use]
    pub fn config_file(&self) -> Utf8PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Returns the audit log path.
    #[must_use]
    pub fn audit_file(&self) -> Utf8PathBuf {
        self.base_dir.join(AUDIT_FILE)
    }
}

/// Returns the lock marker name for a record file name.
#[must_use]
pub fn lock_marker_name(record_file_name: &str) -> String {
    format!("{record_file_name}{LOCK_SUFFIX}")
}
