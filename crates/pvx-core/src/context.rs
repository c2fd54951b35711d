use std::fmt;
use std::sync::Arc;

use crate::client::ClusterClient;
use crate::config::OrchestratorConfig;
use crate::metrics::MetricsHandle;
use crate::waiter::{LogSinkHandle, TracingLogSink};

/// Shared operation context passed to the waiter, orchestrator and batch runners.
#[derive(Clone)]
pub struct OpsContext {
    client: Arc<dyn ClusterClient>,
    metrics: MetricsHandle,
    sink: LogSinkHandle,
    config: OrchestratorConfig,
}

impl OpsContext {
    /// Create a context with no-op metrics and a tracing log sink.
    pub fn new(client: Arc<dyn ClusterClient>, config: OrchestratorConfig) -> Self {
        Self {
            client,
            metrics: crate::metrics::noop_metrics(),
            sink: Arc::new(TracingLogSink),
            config,
        }
    }

    /// Get the cluster client.
    pub fn client(&self) -> &dyn ClusterClient {
        self.client.as_ref()
    }

    /// Get a shared handle to the cluster client.
    pub fn client_handle(&self) -> Arc<dyn ClusterClient> {
        Arc::clone(&self.client)
    }

    /// Get a clonable handle to the metrics backend.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    /// Get the sink receiving job log lines.
    pub fn sink(&self) -> &LogSinkHandle {
        &self.sink
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Replace the metrics backend and return updated context.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the log sink and return updated context.
    pub fn with_log_sink(mut self, sink: LogSinkHandle) -> Self {
        self.sink = sink;
        self
    }
}

impl fmt::Debug for OpsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsContext")
            .field("client", &"<client>")
            .field("metrics", &"<handle>")
            .field("sink", &"<sink>")
            .field("config", &self.config)
            .finish()
    }
}

impl fmt::Display for OpsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OpsContext(poll_interval_ms={}, low_id_threshold={})",
            self.config.poll_interval_ms, self.config.low_id_threshold
        )
    }
}
