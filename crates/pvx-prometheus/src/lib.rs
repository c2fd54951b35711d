//! Prometheus backend for pvx operation metrics.
//!
//! [`PrometheusMetrics`] implements [`pvx_core::MetricsBackend`]. A CLI run is
//! short-lived, so instead of serving `/metrics` the registry is written in
//! text format to a file picked up by node-exporter's textfile collector.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use pvx_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: pvx_core::MetricsHandle = Arc::new(metrics.clone());
//! # let _ = handle;
//!
//! let text = metrics.encode_text()?;
//! assert!(text.is_empty() || text.contains("pvx_"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `pvx_tasks_started_total{operation}` - Counter
//! - `pvx_tasks_completed_total{operation, outcome}` - Counter
//! - `pvx_task_duration_seconds{operation}` - Histogram
//! - `pvx_operation_errors_total{operation, error_kind}` - Counter
mod backend;
pub use backend::PrometheusMetrics;

mod export;
pub use export::ExportError;

pub use prometheus::{Encoder, Registry, TextEncoder};
