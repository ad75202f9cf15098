//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use camino::Utf8PathBuf;
use cap_std::{ambient_authority, fs_utf8::Dir};
use dossier::task::{
    adapters::{
        filesystem::{
            AUDIT_FILE, CONFIG_FILE, JsonLinesAuditSink, MarkdownTaskStore,
            YamlWorkflowConfigProvider,
        },
        identity::EnvCallerResolver,
    },
    domain::{AuditEntry, TaskId, TaskRecord},
    ports::{RecordLock, TaskStore, WorkflowConfigProvider},
    services::{TaskLifecycleResult, TaskLifecycleService},
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest::fixture;
use tempfile::TempDir;

/// Service type used by the BDD world.
pub type ScenarioService =
    TaskLifecycleService<MarkdownTaskStore, JsonLinesAuditSink, EnvCallerResolver, DefaultClock>;

const DELIVERY_WORKFLOW: &str = concat!(
    "statuses: [Backlog, Ready, InProgress, Review, Done]\n",
    "in_progress_statuses: [InProgress]\n",
    "transitions:\n",
    "  Backlog: [Ready]\n",
    "  Ready: [InProgress, Backlog]\n",
    "  InProgress: [Review]\n",
    "  Review: [Done, InProgress]\n",
    "maintainers: [lead]\n",
);

/// Scenario world backed by a temporary collection directory.
pub struct LifecycleWorld {
    _guard: TempDir,
    pub base: Utf8PathBuf,
    pub store: Arc<MarkdownTaskStore>,
    pub service: ScenarioService,
    pub held_lock: Option<RecordLock>,
    pub snapshot: Option<(String, Vec<u8>)>,
    pub last_result: Option<TaskLifecycleResult<TaskRecord>>,
}

impl LifecycleWorld {
    /// Creates a collection with the delivery workflow configured.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary collection cannot be prepared.
    pub fn new() -> eyre::Result<Self> {
        let guard = tempfile::tempdir().wrap_err("create scenario directory")?;
        let base = Utf8PathBuf::from_path_buf(guard.path().to_path_buf())
            .map_err(|path| eyre::eyre!("non UTF-8 temp path: {}", path.display()))?;
        Dir::open_ambient_dir(&base, ambient_authority())?.write(CONFIG_FILE, DELIVERY_WORKFLOW)?;

        let config = YamlWorkflowConfigProvider::new().load(&base)?;
        let store = Arc::new(MarkdownTaskStore::create(&base)?);
        let service = TaskLifecycleService::new(
            Arc::clone(&store),
            Arc::new(JsonLinesAuditSink::open(&base)?),
            Arc::new(EnvCallerResolver::with_fallback(None)),
            Arc::new(DefaultClock),
            config,
        );

        Ok(Self {
            _guard: guard,
            base,
            store,
            service,
            held_lock: None,
            snapshot: None,
            last_result: None,
        })
    }

    /// Returns the file name and raw bytes of a stored record.
    ///
    /// # Errors
    ///
    /// Returns an error when the record cannot be located or read.
    pub fn record_bytes(&self, id: &str) -> eyre::Result<(String, Vec<u8>)> {
        let record = run_async(self.store.load(&TaskId::new(id)?))?;
        let file_name = record
            .source_path()
            .and_then(|path| path.file_name())
            .ok_or_else(|| eyre::eyre!("record {id} has no source file"))?
            .to_owned();
        let collection = Dir::open_ambient_dir(self.store.collection_dir(), ambient_authority())?;
        let bytes = collection.read(&file_name)?;
        Ok((file_name, bytes))
    }

    /// Reads every audit entry written so far.
    ///
    /// # Errors
    ///
    /// Returns an error when the audit log exists but cannot be parsed.
    pub fn audit_entries(&self) -> eyre::Result<Vec<AuditEntry>> {
        let base = Dir::open_ambient_dir(&self.base, ambient_authority())?;
        if !base.exists(AUDIT_FILE) {
            return Ok(Vec::new());
        }
        let text = base.read_to_string(AUDIT_FILE)?;
        Ok(text
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?)
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::new().expect("prepare scenario collection")
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
