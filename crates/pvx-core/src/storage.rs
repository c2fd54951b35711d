//! Storage content listing, backup discovery and template upload.
use std::fmt;
use std::path::Path;

use pvx_model::{BackupArchive, ContainerId, StorageVolume};
use tracing::{info, instrument, warn};

use crate::context::OpsContext;
use crate::error::CoreError;
use crate::waiter::TaskWaiter;

/// Why a template is uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadReason {
    NotPresent,
    /// A smaller copy with the same file name exists on the storage.
    SizeMismatch { local: u64, remote: u64 },
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDecision {
    Upload(UploadReason),
    /// The storage already holds a copy at least as large as the local file.
    Skip { remote_size: u64 },
}

impl UploadDecision {
    pub fn should_upload(&self) -> bool {
        matches!(self, UploadDecision::Upload(_))
    }
}

fn mib(bytes: u64) -> u64 {
    bytes / 1024 / 1024
}

impl fmt::Display for UploadDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadDecision::Skip { remote_size } => {
                write!(f, "already on server ({}MB)", mib(*remote_size))
            }
            UploadDecision::Upload(UploadReason::NotPresent) => f.write_str("not on server"),
            UploadDecision::Upload(UploadReason::SizeMismatch { local, remote }) => write!(
                f,
                "wrong size on server (local: {}MB, server: {}MB)",
                mib(*local),
                mib(*remote)
            ),
            UploadDecision::Upload(UploadReason::Forced) => f.write_str("forced"),
        }
    }
}

/// Read access to node storages plus template upload.
pub struct StorageCatalog {
    ctx: OpsContext,
    waiter: TaskWaiter,
}

impl StorageCatalog {
    pub fn new(ctx: &OpsContext) -> Self {
        Self {
            ctx: ctx.clone(),
            waiter: TaskWaiter::from_context(ctx),
        }
    }

    pub async fn list(&self, node: &str, storage: &str) -> Result<Vec<StorageVolume>, CoreError> {
        Ok(self.ctx.client().list_storage_content(node, storage).await?)
    }

    /// Container backup archives of `id` on a storage.
    pub async fn backups_for(
        &self,
        node: &str,
        storage: &str,
        id: ContainerId,
    ) -> Result<Vec<BackupArchive>, CoreError> {
        let volumes = self.list(node, storage).await?;
        Ok(volumes
            .iter()
            .filter_map(|v| v.volume_id().ok())
            .filter_map(|v| BackupArchive::parse(&v))
            .filter(|a| a.is_container_backup_of(id))
            .collect())
    }

    /// Decide whether `file_name` of `local_size` bytes must be uploaded.
    ///
    /// Only the first volume with a matching file name is considered.
    pub fn decide_upload(
        volumes: &[StorageVolume],
        file_name: &str,
        local_size: u64,
        force: bool,
    ) -> UploadDecision {
        if force {
            return UploadDecision::Upload(UploadReason::Forced);
        }
        let existing = volumes.iter().find(|v| {
            v.volume_id()
                .map(|id| id.file_name() == file_name)
                .unwrap_or(false)
        });
        match existing {
            None => UploadDecision::Upload(UploadReason::NotPresent),
            Some(v) => {
                let remote = v.size.unwrap_or(0);
                if remote >= local_size {
                    UploadDecision::Skip { remote_size: remote }
                } else {
                    UploadDecision::Upload(UploadReason::SizeMismatch {
                        local: local_size,
                        remote,
                    })
                }
            }
        }
    }

    /// Upload a template unless the storage already has it, waiting on the
    /// import job when the cluster runs one.
    #[instrument(level = "debug", skip(self, file), fields(file = %file.display()))]
    pub async fn upload_template(
        &self,
        node: &str,
        storage: &str,
        file: &Path,
        force: bool,
    ) -> Result<UploadDecision, CoreError> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CoreError::Config(format!("not a file path: {}", file.display())))?;
        let local_size = tokio::fs::metadata(file).await?.len();

        let volumes = self.list(node, storage).await?;
        let decision = Self::decide_upload(&volumes, file_name, local_size, force);
        if !decision.should_upload() {
            info!(template = file_name, "template {decision}");
            return Ok(decision);
        }

        info!(template = file_name, storage, node, reason = %decision, "upload template");
        let handle = self.ctx.client().upload_template(file, node, storage).await?;
        let Some(handle) = handle else {
            return Ok(decision);
        };
        if !self.waiter.wait(&Ok(handle), node).await {
            warn!(template = file_name, "template import failed");
            return Err(CoreError::UploadFailed {
                file: file_name.to_string(),
            });
        }
        Ok(decision)
    }
}
