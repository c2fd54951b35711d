//! Per-container lifecycle operations.
//!
//! Each operation resolves the container in the [`ClusterStateCache`],
//! checks the record is complete, submits one job and waits for it. Routine
//! failures come back as `false`; escalation is up to the caller.
use std::time::Instant;

use pvx_model::{
    BackupMode, ContainerId, ContainerRecord, OperationKind, OperationRequest, Snapshot,
};
use tracing::{debug, info, instrument, warn};

use crate::cache::ClusterStateCache;
use crate::context::OpsContext;
use crate::metrics::TaskOutcome;
use crate::waiter::TaskWaiter;

/// Parameters of a restore from a backup archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSpec {
    /// Target storage for the restored root filesystem.
    pub storage: String,
    /// Storage holding the archive.
    pub backup_storage: String,
    /// Archive file name, relative to `backup_storage`.
    pub file: String,
    /// Restore onto this node without consulting the cache.
    ///
    /// Used when the target id does not exist yet.
    pub node: Option<String>,
}

impl RestoreSpec {
    /// Source volume id, `<backup_storage>:<file>`.
    pub fn archive(&self) -> String {
        format!("{}:{}", self.backup_storage, self.file)
    }
}

/// Runs lifecycle operations against a fixed cluster snapshot.
pub struct ContainerOrchestrator<'a> {
    ctx: OpsContext,
    cache: &'a ClusterStateCache,
    waiter: TaskWaiter,
}

impl<'a> ContainerOrchestrator<'a> {
    pub fn new(ctx: &OpsContext, cache: &'a ClusterStateCache) -> Self {
        Self {
            ctx: ctx.clone(),
            cache,
            waiter: TaskWaiter::from_context(ctx),
        }
    }

    pub fn cache(&self) -> &'a ClusterStateCache {
        self.cache
    }

    pub fn context(&self) -> &OpsContext {
        &self.ctx
    }

    pub fn waiter(&self) -> &TaskWaiter {
        &self.waiter
    }

    /// Hard-stop a container. Already stopped containers succeed without a call.
    #[instrument(level = "debug", skip(self), fields(id = %id))]
    pub async fn stop(&self, id: ContainerId) -> bool {
        let Some(record) = self.resolve(OperationKind::Stop.as_label(), id) else {
            return false;
        };
        if record.status.is_stopped() {
            debug!(id = %id, "container already stopped");
            return true;
        }
        info!(id = %id, name = record.label(), "stop container");
        self.run(&record.node, OperationRequest::Stop { id }).await
    }

    /// Remove a container. The record must carry a name.
    #[instrument(level = "debug", skip(self), fields(id = %id))]
    pub async fn destroy(&self, id: ContainerId) -> bool {
        let op = OperationKind::Destroy.as_label();
        let Some(record) = self.resolve(op, id) else {
            return false;
        };
        let name = match record.require_name() {
            Ok(name) => name,
            Err(err) => {
                self.precondition_failed(op, &err);
                return false;
            }
        };
        info!(id = %id, name, "destroy container");
        self.run(&record.node, OperationRequest::Destroy { id }).await
    }

    #[instrument(level = "debug", skip(self, description), fields(id = %id))]
    pub async fn snapshot_create(&self, id: ContainerId, name: &str, description: &str) -> bool {
        let Some(record) = self.resolve(OperationKind::SnapshotCreate.as_label(), id) else {
            return false;
        };
        info!(id = %id, name = record.label(), snapshot = name, "create snapshot");
        let request = OperationRequest::SnapshotCreate {
            id,
            name: name.to_string(),
            description: description.to_string(),
        };
        self.run(&record.node, request).await
    }

    /// Snapshots of a container as reported by the cluster, `current` included.
    ///
    /// `None` when the record is invalid or the listing fails.
    #[instrument(level = "debug", skip(self), fields(id = %id))]
    pub async fn snapshot_list(&self, id: ContainerId) -> Option<Vec<Snapshot>> {
        let record = self.resolve(OperationKind::SnapshotList.as_label(), id)?;
        match self.ctx.client().list_snapshots(&record.node, id).await {
            Ok(list) => Some(list),
            Err(err) => {
                warn!(id = %id, error = %err, "snapshot listing failed");
                None
            }
        }
    }

    #[instrument(level = "debug", skip(self), fields(id = %id))]
    pub async fn snapshot_delete(&self, id: ContainerId, name: &str) -> bool {
        let Some(record) = self.resolve(OperationKind::SnapshotDelete.as_label(), id) else {
            return false;
        };
        info!(id = %id, name = record.label(), snapshot = name, "delete snapshot");
        let request = OperationRequest::SnapshotDelete {
            id,
            name: name.to_string(),
        };
        self.run(&record.node, request).await
    }

    /// vzdump a single container to `storage`.
    #[instrument(level = "debug", skip(self), fields(id = %id))]
    pub async fn backup(&self, id: ContainerId, storage: &str, mode: BackupMode) -> bool {
        let Some(record) = self.resolve(OperationKind::Backup.as_label(), id) else {
            return false;
        };
        info!(id = %id, name = record.label(), storage, mode = %mode, "backup container");
        let request = OperationRequest::Backup {
            id,
            storage: storage.to_string(),
            mode,
        };
        self.run(&record.node, request).await
    }

    /// Recreate `id` from a backup archive, overwriting an existing container.
    #[instrument(level = "debug", skip(self, spec), fields(id = %id))]
    pub async fn restore(&self, id: ContainerId, spec: &RestoreSpec) -> bool {
        let record = match &spec.node {
            Some(node) => ContainerRecord::placeholder(id, node.clone()),
            None => match self.resolve(OperationKind::Restore.as_label(), id) {
                Some(record) => record.clone(),
                None => return false,
            },
        };
        let archive = spec.archive();
        info!(
            archive = %archive,
            id = %id,
            name = record.label(),
            storage = %spec.storage,
            "restore container from backup"
        );
        let request = OperationRequest::Restore {
            id,
            archive,
            storage: spec.storage.clone(),
        };
        self.run(&record.node, request).await
    }

    /// Look up a complete record, recording the precondition failure otherwise.
    fn resolve(&self, op: &str, id: ContainerId) -> Option<&'a ContainerRecord> {
        let Some(entry) = self.cache.lookup(id) else {
            warn!(op, id = %id, "unknown container");
            self.ctx.metrics().record_operation_error(op, "unknown_container");
            return None;
        };
        match entry.record() {
            Ok(record) => Some(record),
            Err(err) => {
                self.precondition_failed(op, &err);
                None
            }
        }
    }

    fn precondition_failed(&self, op: &str, err: &pvx_model::ModelError) {
        warn!(op, error = %err, "precondition not met");
        self.ctx.metrics().record_operation_error(op, "precondition");
    }

    /// Submit one job, wait for it and record its outcome.
    async fn run(&self, node: &str, request: OperationRequest) -> bool {
        let op = request.kind().as_label();
        let metrics = self.ctx.metrics();
        metrics.record_task_started(op);
        let started = Instant::now();

        let submitted = self.ctx.client().submit(node, &request).await;
        let refused = submitted.is_err();
        let ok = self.waiter.wait(&submitted, node).await;

        let outcome = match (ok, refused) {
            (true, _) => TaskOutcome::Success,
            (false, true) => TaskOutcome::Rejected,
            (false, false) => TaskOutcome::Failure,
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        metrics.record_task_completed(op, outcome, duration_ms);
        ok
    }
}
