//! Table of per-container commands generated from the cluster snapshot.
//!
//! Every known container gets `destroy`, `backup:create`, `backup:restore`
//! and `snapshot:create` entries plus one `snapshot:delete` entry per
//! existing snapshot. The table is built once and never regenerated mid-run.
use std::collections::BTreeMap;

use pvx_model::{BackupMode, ContainerEntry, ContainerId, OperationKind, Snapshot};
use tracing::{debug, instrument, warn};

use crate::cache::ClusterStateCache;
use crate::error::CoreError;
use crate::orchestrator::{ContainerOrchestrator, RestoreSpec};

pub const DEFAULT_STORAGE: &str = "local";
pub const DEFAULT_SNAPSHOT_NAME: &str = "pvxsnap1";
pub const DEFAULT_SNAPSHOT_DESCRIPTION: &str = "snapshot taken by pvx";

/// Action bound to one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerCommand {
    /// Stop, then destroy.
    Destroy,
    BackupCreate,
    BackupRestore,
    SnapshotCreate,
    /// Delete one existing snapshot.
    SnapshotDelete { snapshot: String },
}

/// Registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    /// Generated name, e.g. `backup:create:web01`.
    pub name: String,
    pub description: String,
    pub id: ContainerId,
    pub command: ContainerCommand,
}

/// Optional arguments of an invocation; unset values fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    pub storage: Option<String>,
    pub mode: Option<BackupMode>,
    pub backup_storage: Option<String>,
    /// Backup archive to restore from, required by `backup:restore`.
    pub file: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CommandArgs {
    fn storage(&self) -> &str {
        self.storage.as_deref().unwrap_or(DEFAULT_STORAGE)
    }

    fn backup_storage(&self) -> &str {
        self.backup_storage.as_deref().unwrap_or(DEFAULT_STORAGE)
    }
}

/// Command table keyed by generated name.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    entries: BTreeMap<String, CommandEntry>,
}

impl CommandRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the cache and already fetched snapshot lists.
    ///
    /// Containers missing from `snapshots` get no `snapshot:delete` entries.
    pub fn from_snapshot(
        cache: &ClusterStateCache,
        snapshots: &BTreeMap<ContainerId, Vec<Snapshot>>,
    ) -> Self {
        let mut registry = Self::new();
        for entry in cache.iter() {
            let label = command_label(entry);
            let id = entry.id();

            registry.register(CommandEntry {
                name: format!("destroy:{label}"),
                description: format!("destroy {label}"),
                id,
                command: ContainerCommand::Destroy,
            });
            registry.register(CommandEntry {
                name: format!("backup:create:{label}"),
                description: format!("backup {label} [storage=local, mode=snapshot]"),
                id,
                command: ContainerCommand::BackupCreate,
            });
            registry.register(CommandEntry {
                name: format!("backup:restore:{label}"),
                description: format!("restore {label} [storage=local, backup-storage=local, file]"),
                id,
                command: ContainerCommand::BackupRestore,
            });
            registry.register(CommandEntry {
                name: format!("snapshot:create:{label}"),
                description: format!("snapshot {label}"),
                id,
                command: ContainerCommand::SnapshotCreate,
            });

            let Some(list) = snapshots.get(&id) else {
                continue;
            };
            for snap in list.iter().filter(|s| !s.is_current()) {
                registry.register(CommandEntry {
                    name: format!("snapshot:delete:{label}:{}", snap.name),
                    description: format!("snapshot {} from {label} ({})", snap.name, snap.summary()),
                    id,
                    command: ContainerCommand::SnapshotDelete {
                        snapshot: snap.name.clone(),
                    },
                });
            }
        }
        registry
    }

    /// Build from the orchestrator's cache, listing snapshots of every valid container.
    #[instrument(level = "debug", skip(orchestrator))]
    pub async fn build(orchestrator: &ContainerOrchestrator<'_>) -> Self {
        let cache = orchestrator.cache();
        let mut snapshots = BTreeMap::new();
        for entry in cache.iter() {
            if entry.record().is_err() {
                continue;
            }
            if let Some(list) = orchestrator.snapshot_list(entry.id()).await {
                snapshots.insert(entry.id(), list);
            }
        }
        let registry = Self::from_snapshot(cache, &snapshots);
        debug!(commands = registry.len(), "command registry built");
        registry
    }

    /// Add an entry. The first entry registered under a name wins.
    pub fn register(&mut self, entry: CommandEntry) {
        if let Some(existing) = self.entries.get(&entry.name) {
            warn!(
                name = %entry.name,
                kept = %existing.id,
                dropped = %entry.id,
                "duplicate command name"
            );
            return;
        }
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.get(name)
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run a registered command, escalating a failed operation to an error.
    #[instrument(level = "debug", skip(self, orchestrator, args))]
    pub async fn invoke(
        &self,
        name: &str,
        orchestrator: &ContainerOrchestrator<'_>,
        args: &CommandArgs,
    ) -> Result<(), CoreError> {
        let entry = self
            .get(name)
            .ok_or_else(|| CoreError::UnknownCommand(name.to_string()))?;
        let id = entry.id;
        let label = orchestrator
            .cache()
            .lookup(id)
            .and_then(ContainerEntry::name)
            .unwrap_or_default()
            .to_string();
        let fail = |op: OperationKind| CoreError::OperationFailed {
            op,
            id,
            name: label.clone(),
        };

        match &entry.command {
            ContainerCommand::Destroy => {
                if !orchestrator.stop(id).await {
                    return Err(fail(OperationKind::Stop));
                }
                if !orchestrator.destroy(id).await {
                    return Err(fail(OperationKind::Destroy));
                }
            }
            ContainerCommand::BackupCreate => {
                let mode = args.mode.unwrap_or_default();
                if !orchestrator.backup(id, args.storage(), mode).await {
                    return Err(fail(OperationKind::Backup));
                }
            }
            ContainerCommand::BackupRestore => {
                let file = args.file.clone().ok_or(CoreError::MissingArgument("file"))?;
                let spec = RestoreSpec {
                    storage: args.storage().to_string(),
                    backup_storage: args.backup_storage().to_string(),
                    file,
                    node: None,
                };
                if !orchestrator.restore(id, &spec).await {
                    return Err(fail(OperationKind::Restore));
                }
            }
            ContainerCommand::SnapshotCreate => {
                let snap = args.name.as_deref().unwrap_or(DEFAULT_SNAPSHOT_NAME);
                let description = args
                    .description
                    .as_deref()
                    .unwrap_or(DEFAULT_SNAPSHOT_DESCRIPTION);
                if !orchestrator.snapshot_create(id, snap, description).await {
                    return Err(fail(OperationKind::SnapshotCreate));
                }
            }
            ContainerCommand::SnapshotDelete { snapshot } => {
                if !orchestrator.snapshot_delete(id, snapshot).await {
                    return Err(fail(OperationKind::SnapshotDelete));
                }
            }
        }
        Ok(())
    }
}

/// Containers are addressed by name, or by id when they have none.
fn command_label(entry: &ContainerEntry) -> String {
    match entry.name() {
        Some(name) => name.to_string(),
        None => entry.id().to_string(),
    }
}
