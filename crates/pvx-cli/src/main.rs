//! `pvx`: batch lifecycle automation for Proxmox VE containers.
//!
//! ```bash
//! export PROXMOX_PVE_CLUSTER=https://pve1:8006/api2/json/
//! export PROXMOX_NODE=pve1 PROXMOX_PASSWORD=...
//!
//! pvx commands
//! pvx destroy-all --exclude-ids 6002:6003
//! pvx backupjob exclude-range --min 900 --max 1000
//! ```
mod cli;
mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use pvx_core::OpsContext;
use pvx_http::ProxmoxClient;
use pvx_observe::{LoggerConfig, init_logger};
use pvx_prometheus::PrometheusMetrics;

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) logger
    let log_cfg = LoggerConfig::from_env()?;
    init_logger(&log_cfg)?;

    // 2) configuration
    let cluster = cli.cluster.to_config();
    let policy = cli.policy.to_config();
    policy.validate()?;

    // 3) metrics + cluster session
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let client = ProxmoxClient::connect(&cluster)
        .await
        .with_context(|| format!("connecting to {}", cluster.endpoint))?;
    info!(endpoint = %cluster.endpoint, user = %cluster.username, "connected");

    let ctx = OpsContext::new(Arc::new(client), policy).with_metrics(metrics.clone());

    // 4) command
    let result = commands::dispatch(cli.command, &ctx).await;
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }

    if let Some(path) = &cli.metrics_file {
        metrics
            .write_textfile(path)
            .with_context(|| format!("writing metrics to {}", path.display()))?;
    }
    result
}
