use std::sync::Arc;

use pvx_model::{LogEntry, TaskHandle};
use tracing::{info, warn};

use crate::client::ClientError;

/// Receiver of replayed job log lines.
///
/// Every entry reaches the sink exactly once, in increasing sequence order.
pub trait TaskLogSink: Send + Sync {
    /// Emit one log line of `task`.
    fn entry(&self, task: &TaskHandle, entry: &LogEntry);

    /// Emit the body of a refused submission. Called at most once per wait.
    fn rejected(&self, error: &ClientError) {
        warn!(error = %error, "cluster refused task submission");
    }
}

/// Shared handle to a log sink.
pub type LogSinkHandle = Arc<dyn TaskLogSink>;

/// Default sink: one tracing event per log line, formatted `[n] text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl TaskLogSink for TracingLogSink {
    fn entry(&self, task: &TaskHandle, entry: &LogEntry) {
        info!(target: "pvx::task", task = %task, "[{}] {}", entry.sequence, entry.text);
    }
}
