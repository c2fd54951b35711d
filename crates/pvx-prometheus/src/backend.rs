use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, proto::MetricFamily};

use pvx_core::{MetricsBackend, TaskOutcome};

const NAMESPACE: &str = "pvx";

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// - `operation`: `stop`, `destroy`, `snapshot_create`, `snapshot_delete`, `backup`, `restore`, `snapshot_list`
/// - `outcome`: `success`, `failure`, `rejected`
/// - `error_kind`: `precondition`, `unknown_container`
#[derive(Clone)]
pub struct PrometheusMetrics {
    tasks_started: CounterVec,
    tasks_completed: CounterVec,
    task_duration: HistogramVec,
    operation_errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create the backend on a caller-provided registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let tasks_started = CounterVec::new(
            Opts::new("tasks_started_total", "Cluster jobs submitted").namespace(NAMESPACE),
            &["operation"],
        )?;
        registry.register(Box::new(tasks_started.clone()))?;

        let tasks_completed = CounterVec::new(
            Opts::new("tasks_completed_total", "Cluster jobs finished, by outcome")
                .namespace(NAMESPACE),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(tasks_completed.clone()))?;

        // lxc jobs range from sub-second stops to long backups
        let task_duration = HistogramVec::new(
            HistogramOpts::new(
                "task_duration_seconds",
                "Time from submission to terminal state",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0]),
            &["operation"],
        )?;
        registry.register(Box::new(task_duration.clone()))?;

        let operation_errors = CounterVec::new(
            Opts::new(
                "operation_errors_total",
                "Operations refused before submission",
            )
            .namespace(NAMESPACE),
            &["operation", "error_kind"],
        )?;
        registry.register(Box::new(operation_errors.clone()))?;

        Ok(Self {
            tasks_started,
            tasks_completed,
            task_duration,
            operation_errors,
            registry,
        })
    }

    /// Create the backend on a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_task_started(&self, operation: &str) {
        self.tasks_started.with_label_values(&[operation]).inc();
    }

    fn record_task_completed(&self, operation: &str, outcome: TaskOutcome, duration_ms: u64) {
        self.tasks_completed
            .with_label_values(&[operation, outcome.as_label()])
            .inc();
        self.task_duration
            .with_label_values(&[operation])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_operation_error(&self, operation: &str, error_kind: &str) {
        self.operation_errors
            .with_label_values(&[operation, error_kind])
            .inc();
    }
}
