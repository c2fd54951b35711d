use serde::{Deserialize, Serialize};

use pvx_model::ContainerId;

use crate::error::CoreError;

/// Operational policy of the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Delay between two status polls of a running task.
    pub poll_interval_ms: u64,
    /// Maximum number of log lines fetched per request.
    pub log_page_limit: u32,
    /// Ids below this value are protected from bulk destruction.
    pub low_id_threshold: u32,
    /// Ids skipped by bulk commands unless the operator passes an explicit list.
    pub default_exclude_ids: Vec<ContainerId>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            log_page_limit: 20,
            low_id_threshold: 6_000,
            default_exclude_ids: ContainerId::new(6_002).into_iter().collect(),
        }
    }
}

impl OrchestratorConfig {
    /// Validate the configuration.
    ///
    /// Rules:
    /// - `log_page_limit` is not zero.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.log_page_limit == 0 {
            return Err(CoreError::Config("log_page_limit cannot be zero".into()));
        }
        Ok(())
    }
}
