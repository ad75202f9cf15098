//! Service layer for guarded task record mutations.

use super::requests::{
    SectionAccess, SectionWriteMode, TransitionTaskRequest, UpdateTaskFieldsRequest,
    WriteSectionRequest,
};
use crate::task::{
    domain::{
        AuditEntry, AuditOperation, CallerContext, CallerId, ErrorCode, TaskDomainError, TaskId,
        TaskRecord, TaskStatus, Version, WorkflowConfig,
    },
    policy::{
        Authorization, AuthorizationGate, DependencyGate, GateError, TransitionCheck,
        TransitionGate,
    },
    ports::{
        AuditSink, CallerResolver, ListedTask, RecordLock, TaskStore, TaskStoreError,
        WorkflowConfigError, WorkflowConfigProvider,
    },
};
use camino::Utf8Path;
use mockable::Clock;
use serde_json::Value as JsonValue;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// A caller-supplied value failed validation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// A workflow gate rejected the mutation.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Workflow configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] WorkflowConfigError),

    /// The caller's version is stale. Reload and retry.
    #[error("version conflict on task {task_id}: expected {expected}, found {actual}")]
    Conflict {
        /// Record identifier.
        task_id: TaskId,
        /// Version supplied by the caller.
        expected: Version,
        /// Version currently stored.
        actual: Version,
    },
}

impl TaskLifecycleError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Domain(err) => err.code(),
            Self::Store(err) => err.code(),
            Self::Gate(err) => err.code(),
            Self::Config(err) => err.code(),
            Self::Conflict { .. } => ErrorCode::Conflict,
        }
    }

    /// Returns whether reloading and retrying may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

enum Change {
    Transition {
        target: TaskStatus,
        force: bool,
    },
    Fields(UpdateTaskFieldsRequest),
    Section {
        heading: String,
        body: String,
        mode: SectionWriteMode,
        access: SectionAccess,
    },
}

impl Change {
    const fn operation(&self) -> AuditOperation {
        match self {
            Self::Transition { .. } => AuditOperation::Transition,
            Self::Fields(_) => AuditOperation::UpdateFields,
            Self::Section { .. } => AuditOperation::WriteSection,
        }
    }
}

struct Mutation<'a> {
    task_id: &'a TaskId,
    expected: Version,
    caller: Option<CallerId>,
}

/// Task lifecycle orchestration service.
///
/// Each mutation runs under the record's advisory lock: load, authorize,
/// compare versions, run the workflow gates, apply, bump the version, write,
/// release. Accepted mutations are then appended to the audit sink on a
/// best-effort basis.
pub struct TaskLifecycleService<S, A, R, C>
where
    S: TaskStore,
    A: AuditSink,
    R: CallerResolver,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    audit: Arc<A>,
    resolver: Arc<R>,
    clock: Arc<C>,
    config: RwLock<Arc<WorkflowConfig>>,
    authorization: AuthorizationGate,
}

impl<S, A, R, C> TaskLifecycleService<S, A, R, C>
where
    S: TaskStore,
    A: AuditSink,
    R: CallerResolver,
    C: Clock + Send + Sync,
{
    /// Creates a service with trust-local disabled.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        audit: Arc<A>,
        resolver: Arc<R>,
        clock: Arc<C>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            store,
            audit,
            resolver,
            clock,
            config: RwLock::new(Arc::new(config)),
            authorization: AuthorizationGate::new(),
        }
    }

    /// Replaces the authorization policy.
    #[must_use]
    pub fn with_authorization(mut self, authorization: AuthorizationGate) -> Self {
        self.authorization = authorization;
        self
    }

    /// Returns the current configuration snapshot.
    #[must_use]
    pub fn config(&self) -> Arc<WorkflowConfig> {
        let guard = self.config.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Loads a fresh configuration snapshot and swaps it in. Mutations
    /// already running keep the snapshot they started with.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Config`] when the provider fails; the
    /// previous snapshot stays in place.
    pub fn reload_config<P>(
        &self,
        provider: &P,
        base_dir: &Utf8Path,
    ) -> TaskLifecycleResult<Arc<WorkflowConfig>>
    where
        P: WorkflowConfigProvider + ?Sized,
    {
        let fresh = Arc::new(provider.load(base_dir)?);
        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&fresh);
        info!(base_dir = %base_dir, "workflow configuration reloaded");
        Ok(fresh)
    }

    /// Loads a record without taking its lock.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the record is missing or
    /// unreadable.
    pub async fn get(&self, id: &TaskId) -> TaskLifecycleResult<TaskRecord> {
        Ok(self.store.load(id).await?)
    }

    /// Lists the collection ordered by record id. Unreadable files appear
    /// as entries carrying their decode error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the collection cannot be
    /// read.
    pub async fn list(&self) -> TaskLifecycleResult<Vec<ListedTask>> {
        let mut listed = self.store.list().await?;
        listed.sort_by(|left, right| sort_key(left).cmp(sort_key(right)));
        Ok(listed)
    }

    /// Changes a record's status.
    ///
    /// # Errors
    ///
    /// Returns `Locked`, `NotFound`, `Unauthorized`, `Conflict`,
    /// `InvalidTransition` or `DependenciesUnmet` as described by
    /// [`TaskLifecycleError::code`].
    pub async fn transition(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<TaskRecord> {
        let TransitionTaskRequest {
            task_id,
            target,
            expected_version,
            force,
            caller,
        } = request;
        self.mutate(
            &task_id,
            expected_version,
            &caller,
            Change::Transition { target, force },
        )
        .await
    }

    /// Updates the assignee, prerequisites, or pass-through fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty update or a
    /// reserved key, plus the locking, authorization, and version errors of
    /// every mutation.
    pub async fn update_fields(
        &self,
        request: UpdateTaskFieldsRequest,
    ) -> TaskLifecycleResult<TaskRecord> {
        if request.is_empty() {
            return Err(TaskDomainError::EmptyUpdate.into());
        }
        let task_id = request.task_id.clone();
        let expected = request.expected_version;
        let caller = request.caller.clone();
        self.mutate(&task_id, expected, &caller, Change::Fields(request))
            .await
    }

    /// Replaces or appends one section of the record's document.
    ///
    /// With [`SectionAccess::Coding`] the record must also be in an
    /// in-progress status.
    ///
    /// # Errors
    ///
    /// Returns `GateViolation` for coding writes outside the in-progress set,
    /// `InvalidInput` for a malformed heading or a body that would read back
    /// as more than one section, plus the locking, authorization, and
    /// version errors of every mutation.
    pub async fn write_section(
        &self,
        request: WriteSectionRequest,
    ) -> TaskLifecycleResult<TaskRecord> {
        let WriteSectionRequest {
            task_id,
            expected_version,
            caller,
            heading,
            body,
            mode,
            access,
        } = request;
        self.mutate(
            &task_id,
            expected_version,
            &caller,
            Change::Section {
                heading,
                body,
                mode,
                access,
            },
        )
        .await
    }

    async fn mutate(
        &self,
        task_id: &TaskId,
        expected: Version,
        caller: &CallerContext,
        change: Change,
    ) -> TaskLifecycleResult<TaskRecord> {
        let config = self.config();
        let mutation = Mutation {
            task_id,
            expected,
            caller: self.resolver.resolve(caller),
        };

        let held = self.store.acquire_lock(task_id).await?;
        let outcome = self.apply_locked(&held, &config, mutation, change).await;
        let released = self.store.release_lock(held).await;

        let (record, entry) = match (outcome, released) {
            (Ok(applied), Ok(())) => applied,
            (Err(err), Ok(())) => return Err(err),
            (Ok(applied), Err(release_err)) => {
                warn!(
                    task_id = %task_id,
                    error = %release_err,
                    "record written but its lock marker could not be removed"
                );
                applied
            }
            (Err(err), Err(release_err)) => {
                warn!(task_id = %task_id, error = %release_err, "failed to release record lock");
                return Err(err);
            }
        };

        info!(
            task_id = %record.id(),
            operation = entry.operation.as_str(),
            version = record.version().value(),
            "task record updated"
        );
        if let Err(err) = self.audit.append(&entry).await {
            warn!(
                task_id = %record.id(),
                operation = entry.operation.as_str(),
                error = %err,
                "audit append failed; mutation kept"
            );
        }
        Ok(record)
    }

    async fn apply_locked(
        &self,
        held: &RecordLock,
        config: &WorkflowConfig,
        mutation: Mutation<'_>,
        change: Change,
    ) -> TaskLifecycleResult<(TaskRecord, AuditEntry)> {
        let mut record = self.store.load(mutation.task_id).await?;

        let authorization = match &change {
            Change::Section {
                access: SectionAccess::Coding,
                ..
            } => self
                .authorization
                .authorize_coding(mutation.caller, &record, config)?,
            _ => self
                .authorization
                .authorize(mutation.caller, &record, config)?,
        };

        if record.version() != mutation.expected {
            return Err(TaskLifecycleError::Conflict {
                task_id: mutation.task_id.clone(),
                expected: mutation.expected,
                actual: record.version(),
            });
        }

        let operation = change.operation();
        let context = self
            .apply_change(config, &authorization, &mut record, change)
            .await?;

        let previous = record.version();
        record.advance_version(&*self.clock)?;
        self.store.write(held, &record).await?;

        let mut entry = AuditEntry::new(operation, Some(authorization.caller), &*self.clock)
            .with_context("task_id", record.id().as_str())
            .with_context("from_version", previous.value())
            .with_context("version", record.version().value());
        entry.context.extend(context);
        Ok((record, entry))
    }

    async fn apply_change(
        &self,
        config: &WorkflowConfig,
        authorization: &Authorization,
        record: &mut TaskRecord,
        change: Change,
    ) -> TaskLifecycleResult<Vec<(String, JsonValue)>> {
        match change {
            Change::Transition { target, force } => {
                let decision = TransitionGate::check(
                    config,
                    TransitionCheck {
                        task_id: record.id(),
                        from: record.status(),
                        to: &target,
                        force,
                        caller_is_maintainer: authorization.is_maintainer,
                    },
                )?;
                DependencyGate::evaluate(config, record, &target, &*self.store)
                    .await?
                    .into_result(record.id())?;

                let from = record
                    .status()
                    .map_or(JsonValue::Null, |status| status.as_str().into());
                record.set_status(target.clone());
                Ok(vec![
                    ("from".to_owned(), from),
                    ("to".to_owned(), target.as_str().into()),
                    ("decision".to_owned(), decision.as_str().into()),
                ])
            }
            Change::Fields(update) => apply_fields(record, update),
            Change::Section {
                heading,
                body,
                mode,
                ..
            } => {
                let sections = &mut record.document_mut().sections;
                match mode {
                    SectionWriteMode::Replace => sections.upsert(heading.as_str(), &body)?,
                    SectionWriteMode::Append => sections.append(heading.as_str(), &body)?,
                }
                let mode_name = match mode {
                    SectionWriteMode::Replace => "replace",
                    SectionWriteMode::Append => "append",
                };
                Ok(vec![
                    ("heading".to_owned(), heading.into()),
                    ("mode".to_owned(), mode_name.into()),
                ])
            }
        }
    }
}

fn apply_fields(
    record: &mut TaskRecord,
    update: UpdateTaskFieldsRequest,
) -> TaskLifecycleResult<Vec<(String, JsonValue)>> {
    let mut changed: Vec<JsonValue> = Vec::new();

    if let Some(assignee) = update.assignee {
        record.set_assignee(assignee);
        changed.push("assignee".into());
    }
    if let Some(depends_on) = update.depends_on {
        record.set_depends_on(depends_on);
        changed.push("depends_on".into());
    }
    for (key, value) in update.set_fields {
        record.set_field(&key, value)?;
        changed.push(key.into());
    }
    for key in update.remove_fields {
        if record.remove_field(&key)?.is_some() {
            changed.push(key.into());
        }
    }
    Ok(vec![("fields".to_owned(), JsonValue::Array(changed))])
}

fn sort_key(entry: &ListedTask) -> &str {
    entry
        .record
        .as_ref()
        .map_or(entry.file_name.as_str(), |record| record.id().as_str())
}
