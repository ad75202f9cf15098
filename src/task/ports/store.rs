//! Store port for task record persistence and record locking.

use crate::task::{
    codec::CodecError,
    domain::{ErrorCode, TaskId, TaskRecord},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Proof that the caller holds the exclusive lock on one record.
///
/// Obtained from [`TaskStore::acquire_lock`] and consumed by
/// [`TaskStore::release_lock`]. Writes require a reference to it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a held lock must be released"]
pub struct RecordLock {
    task_id: TaskId,
    record_path: Utf8PathBuf,
    marker_path: Utf8PathBuf,
}

impl RecordLock {
    /// Creates a lock token. Only store implementations should call this,
    /// after creating the marker.
    pub fn new(task_id: TaskId, record_path: Utf8PathBuf, marker_path: Utf8PathBuf) -> Self {
        Self {
            task_id,
            record_path,
            marker_path,
        }
    }

    /// Returns the locked record's identifier.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the locked record's path.
    #[must_use]
    pub fn record_path(&self) -> &Utf8Path {
        &self.record_path
    }

    /// Returns the lock marker's path.
    #[must_use]
    pub fn marker_path(&self) -> &Utf8Path {
        &self.marker_path
    }
}

/// One entry of a collection listing.
#[derive(Debug)]
pub struct ListedTask {
    /// File name inside the collection directory.
    pub file_name: String,
    /// The decoded record, or why it could not be read.
    pub record: Result<TaskRecord, CodecError>,
}

/// Task record persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Loads a record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when no file carries the id and
    /// [`TaskStoreError::Codec`] when the file cannot be decoded.
    async fn load(&self, id: &TaskId) -> TaskStoreResult<TaskRecord>;

    /// Lists every record file in the collection, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Io`] when the collection cannot be read.
    /// Per-file decoding failures are reported inside each entry.
    async fn list(&self) -> TaskStoreResult<Vec<ListedTask>>;

    /// Stores a brand-new record at version 1.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::AlreadyExists`] when a record with the same
    /// id exists.
    async fn create(&self, record: &TaskRecord) -> TaskStoreResult<TaskRecord>;

    /// Takes the exclusive lock on a record without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Locked`] immediately when another writer
    /// holds the lock and [`TaskStoreError::NotFound`] when the record does
    /// not exist.
    async fn acquire_lock(&self, id: &TaskId) -> TaskStoreResult<RecordLock>;

    /// Releases a lock. Releasing a lock whose marker is already gone
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Io`] when the marker exists but cannot be
    /// removed.
    async fn release_lock(&self, lock: RecordLock) -> TaskStoreResult<()>;

    /// Replaces the stored record while its lock is held.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::LockNotHeld`] when `lock` belongs to a
    /// different record and [`TaskStoreError::Io`] on write failure.
    async fn write(&self, lock: &RecordLock, record: &TaskRecord) -> TaskStoreResult<()>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// No record carries the identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Another writer holds the record lock.
    #[error("task {task_id} is locked by another writer (marker: {marker_path})")]
    Locked {
        /// Record identifier.
        task_id: TaskId,
        /// Path of the existing lock marker.
        marker_path: Utf8PathBuf,
    },

    /// A record with the identifier already exists.
    #[error("task already exists: {0}")]
    AlreadyExists(TaskId),

    /// A write was attempted with a lock for another record.
    #[error("lock for task {0} is not held by this writer")]
    LockNotHeld(TaskId),

    /// The stored text is not a valid record.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Unexpected filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TaskStoreError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Locked { .. } => ErrorCode::Locked,
            Self::AlreadyExists(_) | Self::LockNotHeld(_) => ErrorCode::InvalidInput,
            Self::Codec(err) => err.code(),
            Self::Io(_) => ErrorCode::Io,
        }
    }

    /// Returns whether the error means the record is absent or unreadable,
    /// as opposed to an infrastructure failure.
    #[must_use]
    pub const fn is_unresolved_record(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Codec(_))
    }
}
