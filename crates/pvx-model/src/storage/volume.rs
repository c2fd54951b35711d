use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Entry of a storage content listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageVolume {
    /// Volume identifier, `<storage>:<content>/<file>`.
    pub volid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl StorageVolume {
    pub fn volume_id(&self) -> Result<VolumeId, ModelError> {
        self.volid.parse()
    }
}

/// Parsed `storage:path` volume identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeId {
    storage: String,
    path: String,
}

impl VolumeId {
    pub fn new(storage: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            storage: storage.into(),
            path: path.into(),
        }
    }

    pub fn storage(&self) -> &str {
        &self.storage
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name component of the path (`backup/vzdump-...tar.lzo` → `vzdump-...tar.lzo`).
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Content directory of the path, if any (`vztmpl`, `backup`, ...).
    pub fn content_dir(&self) -> Option<&str> {
        self.path.split_once('/').map(|(dir, _)| dir)
    }
}

impl FromStr for VolumeId {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((storage, path)) if !storage.is_empty() && !path.is_empty() => {
                Ok(Self::new(storage, path))
            }
            _ => Err(ModelError::InvalidVolumeId(s.to_string())),
        }
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.storage, self.path)
    }
}
