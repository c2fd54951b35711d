mod domain;
pub use domain::{CONTAINER_TYPE, EXIT_OK, SNAPSHOT_CURRENT};
pub use domain::{ContainerId, ExcludeSet, ExclusionRange};

mod error;
pub use error::{ModelError, ModelResult};

mod container;
pub use container::{ContainerEntry, ContainerRecord, ContainerStatus, InvalidContainer, ResourceEntry};

mod task;
pub use task::{LogEntry, TaskHandle, TaskState};

mod kind;
pub use kind::{BackupMode, OperationKind, OperationRequest};

mod backup_job;
pub use backup_job::{BackupJob, BackupJobUpdate};

mod storage;
pub use storage::{BackupArchive, Snapshot, StorageVolume, VolumeId};
