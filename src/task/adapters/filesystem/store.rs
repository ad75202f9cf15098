//! Markdown file store for task records.

use super::blocking::run_blocking;
use super::layout::{StoreLayout, lock_marker_name};
use super::lock;
use crate::task::{
    codec::{self, file_name_for, id_from_file_name, is_record_file_name},
    domain::{TaskId, TaskRecord},
    ports::{ListedTask, RecordLock, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stores each record as `<id> - <title>.md` inside one collection
/// directory, with `<file>.lock` markers beside the records.
#[derive(Debug, Clone)]
pub struct MarkdownTaskStore {
    dir: Arc<Dir>,
    root: Utf8PathBuf,
}

impl MarkdownTaskStore {
    /// Opens the collection directory under `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory does not exist or cannot be
    /// opened.
    pub fn open(base_dir: &Utf8Path) -> io::Result<Self> {
        Self::open_collection(&StoreLayout::new(base_dir).collection_dir())
    }

    /// Opens the collection directory under `base_dir`, creating it first
    /// when missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn create(base_dir: &Utf8Path) -> io::Result<Self> {
        let collection = StoreLayout::new(base_dir).collection_dir();
        Dir::create_ambient_dir_all(&collection, ambient_authority())?;
        Self::open_collection(&collection)
    }

    /// Opens an explicit collection directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be opened.
    pub fn open_collection(collection: &Utf8Path) -> io::Result<Self> {
        let dir = Dir::open_ambient_dir(collection, ambient_authority())?;
        Ok(Self {
            dir: Arc::new(dir),
            root: collection.to_path_buf(),
        })
    }

    /// Returns the collection directory path.
    #[must_use]
    pub fn collection_dir(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns whether a lock marker exists for the record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the record does not exist.
    pub async fn is_locked(&self, id: &TaskId) -> TaskStoreResult<bool> {
        let dir = Arc::clone(&self.dir);
        let task_id = id.clone();
        run_blocking(move || {
            let file_name = require_record_file(&dir, &task_id)?;
            Ok::<_, TaskStoreError>(lock::is_held(&dir, &lock_marker_name(&file_name))?)
        })
        .await
    }

    /// Removes an orphaned lock marker left behind by a crashed writer.
    ///
    /// Locks never expire on their own; this is the manual clearance step.
    /// Returns whether a marker was present.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the record does not exist.
    pub async fn clear_orphaned_lock(&self, id: &TaskId) -> TaskStoreResult<bool> {
        let dir = Arc::clone(&self.dir);
        let task_id = id.clone();
        let removed = run_blocking(move || {
            let file_name = require_record_file(&dir, &task_id)?;
            let marker = lock_marker_name(&file_name);
            let present = lock::is_held(&dir, &marker)?;
            lock::release(&dir, &marker)?;
            Ok::<_, TaskStoreError>(present)
        })
        .await?;
        if removed {
            warn!(task_id = %id, "orphaned lock marker removed");
        }
        Ok(removed)
    }
}

#[async_trait]
impl TaskStore for MarkdownTaskStore {
    async fn load(&self, id: &TaskId) -> TaskStoreResult<TaskRecord> {
        let dir = Arc::clone(&self.dir);
        let root = self.root.clone();
        let task_id = id.clone();
        run_blocking(move || {
            let file_name = require_record_file(&dir, &task_id)?;
            read_record(&dir, &root, &file_name)
        })
        .await
    }

    async fn list(&self) -> TaskStoreResult<Vec<ListedTask>> {
        let dir = Arc::clone(&self.dir);
        let root = self.root.clone();
        run_blocking(move || {
            let mut names = record_file_names(&dir)?;
            names.sort();
            names
                .into_iter()
                .map(|file_name| -> TaskStoreResult<ListedTask> {
                    let text = dir.read_to_string(&file_name)?;
                    let record = codec::decode(&text, Some(&root.join(&file_name)));
                    Ok(ListedTask { file_name, record })
                })
                .collect::<TaskStoreResult<Vec<_>>>()
        })
        .await
    }

    async fn create(&self, record: &TaskRecord) -> TaskStoreResult<TaskRecord> {
        let dir = Arc::clone(&self.dir);
        let root = self.root.clone();
        let mut stored = record.clone();
        run_blocking(move || {
            if find_record_file(&dir, stored.id())?.is_some() {
                return Err(TaskStoreError::AlreadyExists(stored.id().clone()));
            }
            let file_name = file_name_for(stored.id(), stored.document().title.as_deref());
            stored.set_source_path(root.join(&file_name));
            let text = codec::encode(&stored)?;

            let mut options = cap_std::fs::OpenOptions::new();
            options.write(true).create_new(true);
            let mut file = dir.open_with(&file_name, &options).map_err(|err| {
                if err.kind() == io::ErrorKind::AlreadyExists {
                    TaskStoreError::AlreadyExists(stored.id().clone())
                } else {
                    TaskStoreError::Io(err)
                }
            })?;
            io::Write::write_all(&mut file, text.as_bytes())?;
            debug!(task_id = %stored.id(), file = %file_name, "task record created");
            Ok(stored)
        })
        .await
    }

    async fn acquire_lock(&self, id: &TaskId) -> TaskStoreResult<RecordLock> {
        let dir = Arc::clone(&self.dir);
        let root = self.root.clone();
        let task_id = id.clone();
        run_blocking(move || {
            let file_name = require_record_file(&dir, &task_id)?;
            let marker = lock_marker_name(&file_name);
            let marker_path = root.join(&marker);
            if !lock::try_acquire(&dir, &marker)? {
                return Err(TaskStoreError::Locked {
                    task_id,
                    marker_path,
                });
            }
            debug!(task_id = %task_id, marker = %marker_path, "record lock acquired");
            Ok(RecordLock::new(task_id, root.join(&file_name), marker_path))
        })
        .await
    }

    async fn release_lock(&self, held: RecordLock) -> TaskStoreResult<()> {
        let dir = Arc::clone(&self.dir);
        run_blocking(move || {
            let marker = entry_name(held.marker_path())?;
            lock::release(&dir, marker)?;
            debug!(task_id = %held.task_id(), marker = %held.marker_path(), "record lock released");
            Ok::<_, TaskStoreError>(())
        })
        .await
    }

    async fn write(&self, held: &RecordLock, record: &TaskRecord) -> TaskStoreResult<()> {
        if held.task_id() != record.id() {
            return Err(TaskStoreError::LockNotHeld(record.id().clone()));
        }
        let text = codec::encode(record)?;
        let dir = Arc::clone(&self.dir);
        let task_id = held.task_id().clone();
        let record_name = entry_name(held.record_path())?.to_owned();
        let marker_name = entry_name(held.marker_path())?.to_owned();
        run_blocking(move || {
            if !lock::is_held(&dir, &marker_name)? {
                return Err(TaskStoreError::LockNotHeld(task_id));
            }
            dir.write(&record_name, text.as_bytes())?;
            Ok(())
        })
        .await
    }
}

fn entry_name(path: &Utf8Path) -> io::Result<&str> {
    path.file_name()
        .ok_or_else(|| io::Error::other(format!("path has no file name: {path}")))
}

fn record_file_names(dir: &Dir) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for item in dir.entries()? {
        let dir_entry = item?;
        if !dir_entry.file_type()?.is_file() {
            continue;
        }
        let file_name = dir_entry.file_name()?;
        if is_record_file_name(&file_name) {
            names.push(file_name);
        }
    }
    Ok(names)
}

fn find_record_file(dir: &Dir, id: &TaskId) -> io::Result<Option<String>> {
    let mut matching: Vec<String> = record_file_names(dir)?
        .into_iter()
        .filter(|name| id_from_file_name(name) == Some(id.as_str()))
        .collect();
    matching.sort();
    if matching.len() > 1 {
        warn!(
            task_id = %id,
            files = ?matching,
            "several record files share one id; using the first"
        );
    }
    Ok(matching.into_iter().next())
}

fn require_record_file(dir: &Dir, id: &TaskId) -> TaskStoreResult<String> {
    find_record_file(dir, id)?.ok_or_else(|| TaskStoreError::NotFound(id.clone()))
}

fn read_record(dir: &Dir, root: &Utf8Path, file_name: &str) -> TaskStoreResult<TaskRecord> {
    let text = dir.read_to_string(file_name)?;
    Ok(codec::decode(&text, Some(&root.join(file_name)))?)
}
