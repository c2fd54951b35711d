use thiserror::Error;

use crate::ContainerId;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid container id: {0}")]
    InvalidContainerId(String),

    #[error("container {id} does not meet preconditions: missing {missing}")]
    PreconditionNotMet {
        id: ContainerId,
        missing: &'static str,
    },

    #[error("unknown container: {0}")]
    UnknownContainer(ContainerId),

    #[error("unknown backup mode: {0}")]
    UnknownBackupMode(String),

    #[error("invalid volume id: {0}")]
    InvalidVolumeId(String),

    #[error("invalid exclude list: {0}")]
    InvalidExclude(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
