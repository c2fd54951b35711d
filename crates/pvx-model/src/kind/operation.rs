use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BackupMode, ContainerId};

/// Kind of lifecycle operation, used in logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Stop,
    Destroy,
    SnapshotCreate,
    /// Read-only; never submitted as a job.
    SnapshotList,
    SnapshotDelete,
    Backup,
    Restore,
}

impl OperationKind {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            OperationKind::Stop => "stop",
            OperationKind::Destroy => "destroy",
            OperationKind::SnapshotCreate => "snapshot_create",
            OperationKind::SnapshotList => "snapshot_list",
            OperationKind::SnapshotDelete => "snapshot_delete",
            OperationKind::Backup => "backup",
            OperationKind::Restore => "restore",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Parameters of one asynchronous job submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum OperationRequest {
    /// Hard-stop a running container.
    Stop { id: ContainerId },
    /// Remove a container and its volumes.
    Destroy { id: ContainerId },
    SnapshotCreate {
        id: ContainerId,
        name: String,
        description: String,
    },
    SnapshotDelete { id: ContainerId, name: String },
    /// vzdump of a single container.
    Backup {
        id: ContainerId,
        storage: String,
        mode: BackupMode,
    },
    /// Recreate a container from a backup archive, overwriting an existing one.
    Restore {
        id: ContainerId,
        /// Source volume, `<backup-storage>:<file>`.
        archive: String,
        /// Target storage for the restored root filesystem.
        storage: String,
    },
}

impl OperationRequest {
    pub fn id(&self) -> ContainerId {
        match self {
            OperationRequest::Stop { id }
            | OperationRequest::Destroy { id }
            | OperationRequest::SnapshotCreate { id, .. }
            | OperationRequest::SnapshotDelete { id, .. }
            | OperationRequest::Backup { id, .. }
            | OperationRequest::Restore { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::Stop { .. } => OperationKind::Stop,
            OperationRequest::Destroy { .. } => OperationKind::Destroy,
            OperationRequest::SnapshotCreate { .. } => OperationKind::SnapshotCreate,
            OperationRequest::SnapshotDelete { .. } => OperationKind::SnapshotDelete,
            OperationRequest::Backup { .. } => OperationKind::Backup,
            OperationRequest::Restore { .. } => OperationKind::Restore,
        }
    }
}
