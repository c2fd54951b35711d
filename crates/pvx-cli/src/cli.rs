use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pvx_core::{DEFAULT_SNAPSHOT_DESCRIPTION, DEFAULT_SNAPSHOT_NAME, DEFAULT_STORAGE, OrchestratorConfig};
use pvx_http::ClusterConfig;
use pvx_model::{BackupMode, ContainerId, ExcludeSet, ModelError};

/// Batch lifecycle automation for Proxmox VE containers.
#[derive(Parser, Debug)]
#[command(name = "pvx", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Write metrics in Prometheus text format to this file before exiting.
    #[arg(long, global = true, env = "PVX_METRICS_FILE", value_name = "FILE")]
    pub metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// API endpoint of the cluster.
    #[arg(
        long = "cluster",
        global = true,
        env = "PROXMOX_PVE_CLUSTER",
        value_name = "URL",
        default_value = "https://localhost:8006/api2/json/"
    )]
    pub endpoint: String,

    #[arg(long, global = true, env = "PROXMOX_USERNAME", default_value = "root")]
    pub username: String,

    #[arg(long, global = true, env = "PROXMOX_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,

    #[arg(long, global = true, env = "PROXMOX_REALM", default_value = "pam")]
    pub realm: String,

    /// Accept self-signed cluster certificates.
    #[arg(long, global = true, env = "PROXMOX_INSECURE_TLS")]
    pub insecure_tls: bool,

    #[arg(long, global = true, env = "PVX_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout_ms: u64,
}

impl ClusterArgs {
    pub fn to_config(&self) -> ClusterConfig {
        ClusterConfig {
            endpoint: self.endpoint.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            realm: self.realm.clone(),
            insecure_tls: self.insecure_tls,
            timeout_ms: self.timeout_ms,
        }
    }
}

#[derive(Args, Debug)]
pub struct PolicyArgs {
    /// Bulk destroy refuses ids below this value without --allow-low-ids.
    #[arg(long, global = true, env = "PVX_LOW_ID_THRESHOLD", default_value_t = 6_000)]
    pub low_id_threshold: u32,

    /// Ids skipped by bulk commands when --exclude-ids is not given.
    #[arg(
        long,
        global = true,
        env = "PVX_DEFAULT_EXCLUDE_IDS",
        value_name = "IDS",
        default_value = "6002",
        value_parser = parse_id_list
    )]
    pub default_exclude_ids: IdList,

    #[arg(long, global = true, env = "PVX_POLL_INTERVAL_MS", default_value_t = 1_000)]
    pub poll_interval_ms: u64,
}

impl PolicyArgs {
    pub fn to_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            poll_interval_ms: self.poll_interval_ms,
            low_id_threshold: self.low_id_threshold,
            default_exclude_ids: self.default_exclude_ids.0.clone(),
            ..OrchestratorConfig::default()
        }
    }
}

/// Colon-separated id list, `6002:6003`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList(pub Vec<ContainerId>);

impl IdList {
    pub fn to_exclude(&self) -> ExcludeSet {
        self.0.iter().copied().collect()
    }
}

fn parse_id_list(s: &str) -> Result<IdList, ModelError> {
    ContainerId::parse_list(s).map(IdList)
}

/// Explicit exclusion list, or the configured default.
pub fn exclusions(explicit: Option<&IdList>, cfg: &OrchestratorConfig) -> ExcludeSet {
    match explicit {
        Some(ids) => ids.to_exclude(),
        None => cfg.default_exclude_ids.iter().copied().collect(),
    }
}

/// Node a storage command runs on, defaulting to `PROXMOX_NODE`.
#[derive(Args, Debug, Clone)]
pub struct NodeArg {
    #[arg(long, env = "PROXMOX_NODE")]
    pub node: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect storages and upload container templates.
    #[command(subcommand)]
    Storage(StorageCommand),

    /// List and restore container backups.
    #[command(subcommand)]
    Backup(BackupCommand),

    /// Stop and destroy every container not excluded.
    DestroyAll {
        #[arg(long, value_name = "IDS", value_parser = parse_id_list)]
        exclude_ids: Option<IdList>,

        /// Also destroy containers below the protected id threshold.
        #[arg(long)]
        allow_low_ids: bool,
    },

    /// Create or delete a snapshot on every container.
    #[command(subcommand)]
    Snapshot(SnapshotCommand),

    /// Inspect scheduled backup jobs and edit their exclusions.
    #[command(subcommand)]
    Backupjob(BackupJobCommand),

    /// List the per-container commands generated from the cluster state.
    Commands,

    /// Run one generated per-container command.
    Run(RunArgs),
}

#[derive(Subcommand, Debug)]
pub enum StorageCommand {
    /// List the content of a storage.
    List {
        #[command(flatten)]
        node: NodeArg,

        #[arg(long, default_value = DEFAULT_STORAGE)]
        storage: String,
    },
    /// Upload a container template unless the storage already holds it.
    UploadTemplate {
        file: PathBuf,

        #[command(flatten)]
        node: NodeArg,

        #[arg(long, default_value = DEFAULT_STORAGE)]
        storage: String,

        /// Upload even when a copy exists.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// List backup archives of a container.
    List {
        id: ContainerId,

        #[command(flatten)]
        node: NodeArg,

        #[arg(long, default_value = DEFAULT_STORAGE)]
        storage: String,
    },
    /// Restore a container from a backup archive.
    Restore {
        id: ContainerId,

        /// Archive file name on the backup storage.
        file: String,

        #[arg(long, default_value = DEFAULT_STORAGE)]
        storage: String,

        #[arg(long, default_value = DEFAULT_STORAGE)]
        backup_storage: String,

        /// Restore onto this node as a new container. Without it the
        /// container's current node is used.
        #[arg(long)]
        node: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommand {
    CreateAll {
        #[arg(long, value_name = "IDS", value_parser = parse_id_list)]
        exclude_ids: Option<IdList>,

        #[arg(long, default_value = DEFAULT_SNAPSHOT_NAME)]
        name: String,

        #[arg(long, default_value = DEFAULT_SNAPSHOT_DESCRIPTION)]
        description: String,
    },
    DeleteAll {
        #[arg(long, value_name = "IDS", value_parser = parse_id_list)]
        exclude_ids: Option<IdList>,

        #[arg(long, default_value = DEFAULT_SNAPSHOT_NAME)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackupJobCommand {
    List {
        #[arg(long)]
        json: bool,
    },
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },
    /// Add every known id in `[min, max)` to the exclusions of all jobs.
    ExcludeRange {
        #[arg(long, default_value_t = 900)]
        min: u32,

        #[arg(long, default_value_t = 1000)]
        max: u32,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Generated command name, see `pvx commands`.
    pub command: String,

    #[arg(long)]
    pub storage: Option<String>,

    #[arg(long)]
    pub mode: Option<BackupMode>,

    #[arg(long)]
    pub backup_storage: Option<String>,

    #[arg(long)]
    pub file: Option<String>,

    /// Snapshot name.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}
