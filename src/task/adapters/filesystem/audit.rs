//! JSON-lines audit log.

use super::blocking::run_blocking;
use super::layout::{AUDIT_FILE, StoreLayout};
use crate::task::{
    domain::AuditEntry,
    ports::{AuditSink, AuditSinkError},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::OpenOptions;
use cap_std::fs_utf8::Dir;
use std::io::{self, Write};
use std::sync::Arc;

/// Appends one JSON object per line to `<base>/audit.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonLinesAuditSink {
    dir: Arc<Dir>,
    path: Utf8PathBuf,
}

impl JsonLinesAuditSink {
    /// Opens the sink for a base directory. The log file is created on the
    /// first append.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the base directory cannot be opened.
    pub fn open(base_dir: &Utf8Path) -> io::Result<Self> {
        let dir = Dir::open_ambient_dir(base_dir, ambient_authority())?;
        Ok(Self {
            dir: Arc::new(dir),
            path: StoreLayout::new(base_dir).audit_file(),
        })
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonLinesAuditSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditSinkError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        let dir = Arc::clone(&self.dir);
        run_blocking(move || {
            let mut options = OpenOptions::new();
            options.append(true).create(true);
            let mut file = dir.open_with(AUDIT_FILE, &options)?;
            file.write_all(&line)?;
            Ok::<_, AuditSinkError>(())
        })
        .await
    }
}
