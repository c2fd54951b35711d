pub mod batch;
pub mod cache;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod exclusion;
pub mod metrics;
pub mod orchestrator;
pub mod registry;
pub mod storage;
pub mod waiter;

#[cfg(test)]
mod fake;

pub use batch::{BatchReport, BatchRunner};
pub use cache::ClusterStateCache;
pub use client::{ClientError, ClusterClient};
pub use config::OrchestratorConfig;
pub use context::OpsContext;
pub use error::CoreError;
pub use exclusion::{ExclusionMerger, JobChange, MergeReport};
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, TaskOutcome, noop_metrics};
pub use orchestrator::{ContainerOrchestrator, RestoreSpec};
pub use registry::{
    CommandArgs, CommandEntry, CommandRegistry, ContainerCommand, DEFAULT_SNAPSHOT_DESCRIPTION,
    DEFAULT_SNAPSHOT_NAME, DEFAULT_STORAGE,
};
pub use storage::{StorageCatalog, UploadDecision, UploadReason};
pub use waiter::{LogSinkHandle, TaskLogSink, TaskWaiter, TracingLogSink};

pub mod prelude {
    pub use crate::cache::ClusterStateCache;
    pub use crate::client::{ClientError, ClusterClient};
    pub use crate::context::OpsContext;
    pub use crate::error::CoreError;
    pub use crate::orchestrator::ContainerOrchestrator;
}
