//! In-memory task store for lifecycle tests.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    codec::{CodecError, file_name_for},
    domain::{TaskId, TaskRecord},
    ports::{ListedTask, RecordLock, TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
///
/// Honours the same lock and existence rules as the filesystem store so that
/// service behaviour can be exercised without touching disk.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    records: BTreeMap<TaskId, Result<TaskRecord, CodecError>>,
    locks: BTreeSet<TaskId>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry whose stored text cannot be decoded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Io`] when the state lock is poisoned.
    pub fn insert_unreadable(&self, id: TaskId, error: CodecError) -> TaskStoreResult<()> {
        self.write_state()?.records.insert(id, Err(error));
        Ok(())
    }

    /// Returns whether the record's lock is currently held.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Io`] when the state lock is poisoned.
    pub fn is_locked(&self, id: &TaskId) -> TaskStoreResult<bool> {
        Ok(self.read_state()?.locks.contains(id))
    }

    fn read_state(&self) -> TaskStoreResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::Io(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> TaskStoreResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::Io(std::io::Error::other(err.to_string())))
    }
}

fn memory_path(record: &TaskRecord) -> Utf8PathBuf {
    Utf8PathBuf::from(file_name_for(record.id(), record.document().title.as_deref()))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn load(&self, id: &TaskId) -> TaskStoreResult<TaskRecord> {
        let state = self.read_state()?;
        match state.records.get(id) {
            Some(Ok(record)) => Ok(record.clone()),
            Some(Err(err)) => Err(TaskStoreError::Codec(err.clone())),
            None => Err(TaskStoreError::NotFound(id.clone())),
        }
    }

    async fn list(&self) -> TaskStoreResult<Vec<ListedTask>> {
        let state = self.read_state()?;
        Ok(state
            .records
            .iter()
            .map(|(id, entry)| ListedTask {
                file_name: entry
                    .as_ref()
                    .map_or_else(|_| format!("{id}.md"), |record| memory_path(record).into_string()),
                record: entry.clone(),
            })
            .collect())
    }

    async fn create(&self, record: &TaskRecord) -> TaskStoreResult<TaskRecord> {
        let mut state = self.write_state()?;
        if state.records.contains_key(record.id()) {
            return Err(TaskStoreError::AlreadyExists(record.id().clone()));
        }
        let mut stored = record.clone();
        stored.set_source_path(memory_path(record));
        state
            .records
            .insert(stored.id().clone(), Ok(stored.clone()));
        Ok(stored)
    }

    async fn acquire_lock(&self, id: &TaskId) -> TaskStoreResult<RecordLock> {
        let mut state = self.write_state()?;
        let record_path = match state.records.get(id) {
            Some(Ok(record)) => memory_path(record),
            Some(Err(_)) => Utf8PathBuf::from(format!("{id}.md")),
            None => return Err(TaskStoreError::NotFound(id.clone())),
        };
        let marker_path = Utf8PathBuf::from(format!("{record_path}.lock"));
        if !state.locks.insert(id.clone()) {
            return Err(TaskStoreError::Locked {
                task_id: id.clone(),
                marker_path,
            });
        }
        Ok(RecordLock::new(id.clone(), record_path, marker_path))
    }

    async fn release_lock(&self, held: RecordLock) -> TaskStoreResult<()> {
        self.write_state()?.locks.remove(held.task_id());
        Ok(())
    }

    async fn write(&self, held: &RecordLock, record: &TaskRecord) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        if held.task_id() != record.id() || !state.locks.contains(record.id()) {
            return Err(TaskStoreError::LockNotHeld(record.id().clone()));
        }
        state.records.insert(record.id().clone(), Ok(record.clone()));
        Ok(())
    }
}
