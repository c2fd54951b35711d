mod volume;
pub use volume::{StorageVolume, VolumeId};

mod archive;
pub use archive::BackupArchive;

mod snapshot;
pub use snapshot::Snapshot;
