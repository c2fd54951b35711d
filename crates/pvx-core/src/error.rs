use thiserror::Error;

use pvx_model::{ContainerId, ModelError, OperationKind};

use crate::client::ClientError;

/// Fatal, batch-level errors.
///
/// Single-container operations report routine failures as `false`; these
/// variants are raised once a caller decides to escalate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(
        "not allowed to destroy id {id}: below protected threshold {threshold} (re-run with --allow-low-ids to override)"
    )]
    SafetyGuard { id: ContainerId, threshold: u32 },

    #[error("failed to {op} container {id} ({name})")]
    OperationFailed {
        op: OperationKind,
        id: ContainerId,
        name: String,
    },

    #[error("update of backup job {job} failed: {source}")]
    UpdateRejected {
        job: String,
        #[source]
        source: ClientError,
    },

    #[error("upload of template {file} failed")]
    UploadFailed { file: String },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cluster request failed: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
