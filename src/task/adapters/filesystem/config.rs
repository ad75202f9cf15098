//! YAML workflow configuration loaded from `<base>/workflow.yaml`.

use super::layout::{CONFIG_FILE, StoreLayout};
use crate::task::{
    domain::{WorkflowConfig, WorkflowSettings},
    ports::{WorkflowConfigError, WorkflowConfigProvider},
};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use tracing::{debug, warn};

/// Reads workflow settings from the base directory's YAML file.
///
/// A missing file yields the permissive default: any status, no transition
/// graph, no maintainers.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlWorkflowConfigProvider;

impl YamlWorkflowConfigProvider {
    /// Creates the provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses configuration text without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowConfigError::Parse`] for malformed YAML and
    /// [`WorkflowConfigError::Invalid`] when a referenced status is not
    /// declared.
    pub fn parse(text: &str, path: &Utf8Path) -> Result<WorkflowConfig, WorkflowConfigError> {
        let settings: WorkflowSettings = if text.trim().is_empty() {
            WorkflowSettings::default()
        } else {
            serde_yaml::from_str(text).map_err(|err| WorkflowConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
        };
        let config = WorkflowConfig::new(settings)?;

        let dead_ends = config.dead_end_statuses();
        if !dead_ends.is_empty() {
            let names: Vec<&str> = dead_ends.iter().map(|status| status.as_str()).collect();
            warn!(
                config = %path,
                statuses = ?names,
                "statuses without outgoing transitions cannot be left except by a forced transition"
            );
        }
        Ok(config)
    }
}

impl WorkflowConfigProvider for YamlWorkflowConfigProvider {
    fn load(&self, base_dir: &Utf8Path) -> Result<WorkflowConfig, WorkflowConfigError> {
        let path = StoreLayout::new(base_dir).config_file();
        let io_error = |source: io::Error| WorkflowConfigError::Io {
            path: path.clone(),
            source,
        };

        let dir = Dir::open_ambient_dir(base_dir, ambient_authority()).map_err(&io_error)?;
        let text = match dir.read_to_string(CONFIG_FILE) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(config = %path, "no workflow configuration; using permissive defaults");
                return Ok(WorkflowConfig::default());
            }
            Err(err) => return Err(io_error(err)),
        };
        Self::parse(&text, &path)
    }
}
