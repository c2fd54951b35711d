//! Collaborator contract between the core and a cluster transport.
//!
//! The core never talks HTTP itself; `pvx-http` implements [`ClusterClient`]
//! against the Proxmox VE API and tests plug in an in-memory fake.
mod error;
pub use error::ClientError;

use std::path::Path;

use async_trait::async_trait;
use pvx_model::{
    BackupJob, BackupJobUpdate, ContainerId, LogEntry, OperationRequest, ResourceEntry, Snapshot,
    StorageVolume, TaskHandle, TaskState,
};

/// Cluster API surface consumed by the core.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Submit an asynchronous job on `node` and return its handle.
    async fn submit(&self, node: &str, request: &OperationRequest) -> Result<TaskHandle, ClientError>;

    /// Query the current state of a job.
    async fn task_status(&self, handle: &TaskHandle, node: &str) -> Result<TaskState, ClientError>;

    /// Fetch up to `limit` log lines with a line number greater than `start`.
    async fn task_log(
        &self,
        handle: &TaskHandle,
        node: &str,
        start: u64,
        limit: u32,
    ) -> Result<Vec<LogEntry>, ClientError>;

    /// Full cluster resource list; the core filters it down to containers.
    async fn cluster_resources(&self) -> Result<Vec<ResourceEntry>, ClientError>;

    async fn list_snapshots(&self, node: &str, id: ContainerId) -> Result<Vec<Snapshot>, ClientError>;

    async fn list_backup_jobs(&self) -> Result<Vec<BackupJob>, ClientError>;

    async fn get_backup_job(&self, id: &str) -> Result<BackupJob, ClientError>;

    async fn update_backup_job(&self, id: &str, update: &BackupJobUpdate) -> Result<(), ClientError>;

    async fn list_storage_content(
        &self,
        node: &str,
        storage: &str,
    ) -> Result<Vec<StorageVolume>, ClientError>;

    /// Upload a container template. Returns the job handle when the cluster runs
    /// the import asynchronously.
    async fn upload_template(
        &self,
        file: &Path,
        node: &str,
        storage: &str,
    ) -> Result<Option<TaskHandle>, ClientError>;
}
