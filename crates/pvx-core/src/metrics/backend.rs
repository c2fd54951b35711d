use std::sync::Arc;

/// Outcome of one submitted cluster job, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Job finished with the success exit status.
    Success,
    /// Job finished with any other exit status, or polling failed.
    Failure,
    /// Submission was refused; no job was created.
    Rejected,
}

impl TaskOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskOutcome::Success => "success",
            TaskOutcome::Failure => "failure",
            TaskOutcome::Rejected => "rejected",
        }
    }
}

/// Backend metrics collection interface.
///
/// `operation` is always an [`pvx_model::OperationKind`] label (`stop`, `destroy`, ...),
/// so label cardinality stays bounded.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record that a job is about to be submitted.
    fn record_task_started(&self, operation: &str);

    /// Record job completion with outcome and wall-clock duration (submission to terminal state).
    fn record_task_completed(&self, operation: &str, outcome: TaskOutcome, duration_ms: u64);

    /// Record an operation that failed before anything was submitted.
    ///
    /// `error_kind` examples: `precondition`, `unknown_container`.
    fn record_operation_error(&self, operation: &str, error_kind: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
