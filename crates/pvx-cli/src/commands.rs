//! Subcommand handlers and their terminal output.
use anyhow::{Context, bail};
use tracing::info;

use pvx_core::{
    BatchReport, BatchRunner, ClusterStateCache, CommandArgs, CommandRegistry,
    ContainerOrchestrator, ExclusionMerger, MergeReport, OpsContext, RestoreSpec,
    StorageCatalog,
};
use pvx_model::{BackupArchive, BackupJob, ContainerId, ExclusionRange, StorageVolume};

use crate::cli::{
    BackupCommand, BackupJobCommand, Command, NodeArg, RunArgs, SnapshotCommand, StorageCommand,
    exclusions,
};

/// Execute one parsed command.
pub async fn dispatch(command: Command, ctx: &OpsContext) -> anyhow::Result<()> {
    match command {
        Command::Storage(cmd) => storage(cmd, ctx).await,
        Command::Backup(cmd) => backup(cmd, ctx).await,
        Command::DestroyAll {
            exclude_ids,
            allow_low_ids,
        } => {
            let cache = load_cache(ctx).await?;
            let orch = ContainerOrchestrator::new(ctx, &cache);
            let exclude = exclusions(exclude_ids.as_ref(), ctx.config());
            let report = BatchRunner::new(&orch).destroy_all(&exclude, allow_low_ids).await?;
            print_lines(render_batch("destroyed", &report));
            Ok(())
        }
        Command::Snapshot(cmd) => snapshot(cmd, ctx).await,
        Command::Backupjob(cmd) => backup_job(cmd, ctx).await,
        Command::Commands => {
            let cache = load_cache(ctx).await?;
            let orch = ContainerOrchestrator::new(ctx, &cache);
            let registry = CommandRegistry::build(&orch).await;
            print_lines(render_registry(&registry));
            Ok(())
        }
        Command::Run(args) => run(args, ctx).await,
    }
}

async fn storage(cmd: StorageCommand, ctx: &OpsContext) -> anyhow::Result<()> {
    let catalog = StorageCatalog::new(ctx);
    match cmd {
        StorageCommand::List { node, storage } => {
            let volumes = catalog.list(require_node(&node)?, &storage).await?;
            print_lines(render_volumes(&volumes));
        }
        StorageCommand::UploadTemplate {
            file,
            node,
            storage,
            force,
        } => {
            let decision = catalog
                .upload_template(require_node(&node)?, &storage, &file, force)
                .await?;
            println!("{}: {decision}", file.display());
        }
    }
    Ok(())
}

async fn backup(cmd: BackupCommand, ctx: &OpsContext) -> anyhow::Result<()> {
    match cmd {
        BackupCommand::List { id, node, storage } => {
            let archives = StorageCatalog::new(ctx)
                .backups_for(require_node(&node)?, &storage, id)
                .await?;
            print_lines(render_archives(&archives));
        }
        BackupCommand::Restore {
            id,
            file,
            storage,
            backup_storage,
            node,
        } => {
            let cache = load_cache(ctx).await?;
            let orch = ContainerOrchestrator::new(ctx, &cache);
            let spec = RestoreSpec {
                storage,
                backup_storage,
                file,
                node,
            };
            if !orch.restore(id, &spec).await {
                bail!("restore of container {id} from {} failed", spec.archive());
            }
        }
    }
    Ok(())
}

async fn snapshot(cmd: SnapshotCommand, ctx: &OpsContext) -> anyhow::Result<()> {
    let cache = load_cache(ctx).await?;
    let orch = ContainerOrchestrator::new(ctx, &cache);
    let runner = BatchRunner::new(&orch);
    let verb = snapshot_verb(&cmd);
    let report = match cmd {
        SnapshotCommand::CreateAll {
            exclude_ids,
            name,
            description,
        } => {
            let exclude = exclusions(exclude_ids.as_ref(), ctx.config());
            runner.snapshot_create_all(&exclude, &name, &description).await?
        }
        SnapshotCommand::DeleteAll { exclude_ids, name } => {
            let exclude = exclusions(exclude_ids.as_ref(), ctx.config());
            runner.snapshot_delete_all(&exclude, &name).await?
        }
    };
    print_lines(render_batch(verb, &report));
    Ok(())
}

fn snapshot_verb(cmd: &SnapshotCommand) -> &'static str {
    match cmd {
        SnapshotCommand::CreateAll { .. } => "snapshotted",
        SnapshotCommand::DeleteAll { .. } => "deleted snapshot from",
    }
}

async fn backup_job(cmd: BackupJobCommand, ctx: &OpsContext) -> anyhow::Result<()> {
    match cmd {
        BackupJobCommand::List { json } => {
            let jobs = ctx.client().list_backup_jobs().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else {
                print_lines(jobs.iter().map(render_job_line).collect());
            }
        }
        BackupJobCommand::Show { id, json } => {
            let job = ctx
                .client()
                .get_backup_job(&id)
                .await
                .with_context(|| format!("backup job {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&job)?);
            } else {
                print_lines(render_job(&job));
            }
        }
        BackupJobCommand::ExcludeRange { min, max } => {
            let range = ExclusionRange::new(min, max)?;
            let cache = load_cache(ctx).await?;
            let report = ExclusionMerger::from_context(ctx, &cache)
                .exclude_range(range)
                .await?;
            print_lines(render_merge(&range, &report));
        }
    }
    Ok(())
}

async fn run(args: RunArgs, ctx: &OpsContext) -> anyhow::Result<()> {
    let cache = load_cache(ctx).await?;
    let orch = ContainerOrchestrator::new(ctx, &cache);
    let registry = CommandRegistry::build(&orch).await;
    let call = CommandArgs {
        storage: args.storage,
        mode: args.mode,
        backup_storage: args.backup_storage,
        file: args.file,
        name: args.name,
        description: args.description,
    };
    registry.invoke(&args.command, &orch, &call).await?;
    info!(command = %args.command, "command finished");
    Ok(())
}

async fn load_cache(ctx: &OpsContext) -> anyhow::Result<ClusterStateCache> {
    ClusterStateCache::refresh(ctx.client())
        .await
        .context("loading cluster resources")
}

fn require_node(node: &NodeArg) -> anyhow::Result<&str> {
    node.node
        .as_deref()
        .context("no node given: pass --node or set PROXMOX_NODE")
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn mib(bytes: u64) -> u64 {
    bytes / 1024 / 1024
}

pub(crate) fn render_volumes(volumes: &[StorageVolume]) -> Vec<String> {
    volumes
        .iter()
        .map(|v| {
            let size = v.size.map(|s| format!("{}MB", mib(s))).unwrap_or_else(|| "-".into());
            let content = v.content.as_deref().unwrap_or("-");
            format!("{:<8} {:>8}  {}", content, size, v.volid)
        })
        .collect()
}

pub(crate) fn render_archives(archives: &[BackupArchive]) -> Vec<String> {
    archives.iter().map(|a| a.volume().file_name().to_string()).collect()
}

pub(crate) fn render_batch(verb: &str, report: &BatchReport) -> Vec<String> {
    let join = |ids: &[ContainerId]| {
        ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
    };
    let mut out = vec![format!("{verb}: {}", join(&report.processed))];
    if !report.skipped.is_empty() {
        out.push(format!("skipped: {}", join(&report.skipped)));
    }
    out
}

pub(crate) fn render_job_line(job: &BackupJob) -> String {
    let exclude = if job.exclude.is_empty() {
        "-".to_string()
    } else {
        job.exclude.to_string()
    };
    format!(
        "{:<16} {:<6} exclude={}",
        job.id,
        job.starttime.as_deref().unwrap_or("-"),
        exclude
    )
}

pub(crate) fn render_job(job: &BackupJob) -> Vec<String> {
    job.fields()
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => format!("{key}: {s}"),
            other => format!("{key}: {other}"),
        })
        .collect()
}

pub(crate) fn render_merge(range: &ExclusionRange, report: &MergeReport) -> Vec<String> {
    if report.candidates.is_empty() {
        return vec![format!("nothing to exclude in {range}")];
    }
    let mut out = Vec::new();
    for change in &report.updated {
        let added: Vec<String> = change.added.iter().map(ToString::to_string).collect();
        out.push(format!("{}: added {}", change.job, added.join(",")));
    }
    for job in &report.skipped {
        out.push(format!("{job}: up to date"));
    }
    out
}

pub(crate) fn render_registry(registry: &CommandRegistry) -> Vec<String> {
    let width = registry.iter().map(|e| e.name.len()).max().unwrap_or(0);
    registry
        .iter()
        .map(|e| format!("{:<width$}  # {}", e.name, e.description))
        .collect()
}
