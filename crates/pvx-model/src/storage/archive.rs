use crate::{CONTAINER_TYPE, ContainerId, VolumeId};

/// Backup file produced by vzdump: `vzdump-<kind>-<vmid>-<date>-<time>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArchive {
    volume: VolumeId,
    kind: String,
    vmid: ContainerId,
}

impl BackupArchive {
    /// Recognise a backup archive by its file name.
    ///
    /// Names with fewer than four dash-separated parts before the first `.`,
    /// an empty kind, or a non-canonical vmid are not archives.
    pub fn parse(volume: &VolumeId) -> Option<Self> {
        let stem = volume.file_name().split('.').next()?;
        let parts: Vec<&str> = stem.split('-').collect();
        if parts.len() < 4 || parts[1].is_empty() {
            return None;
        }
        let vmid = ContainerId::parse_exact(parts[2])?;
        Some(Self {
            volume: volume.clone(),
            kind: parts[1].to_string(),
            vmid,
        })
    }

    pub fn volume(&self) -> &VolumeId {
        &self.volume
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn vmid(&self) -> ContainerId {
        self.vmid
    }

    /// Returns `true` if this is a container backup of `id`.
    pub fn is_container_backup_of(&self, id: ContainerId) -> bool {
        self.kind == CONTAINER_TYPE && self.vmid == id
    }
}
