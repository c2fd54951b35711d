//! Sequential bulk operations over every cached container.
use pvx_model::{ContainerEntry, ContainerId, ExcludeSet, OperationKind};
use tracing::{info, instrument};

use crate::error::CoreError;
use crate::orchestrator::ContainerOrchestrator;

/// Ids handled by a completed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: Vec<ContainerId>,
    pub skipped: Vec<ContainerId>,
}

/// Applies one operation to all containers in ascending id order.
///
/// Fail-fast: the first `false` aborts the batch with
/// [`CoreError::OperationFailed`].
pub struct BatchRunner<'o, 'a> {
    orchestrator: &'o ContainerOrchestrator<'a>,
}

impl<'o, 'a> BatchRunner<'o, 'a> {
    pub fn new(orchestrator: &'o ContainerOrchestrator<'a>) -> Self {
        Self { orchestrator }
    }

    /// Stop then destroy every container not in `exclude`.
    ///
    /// Unless `allow_low_ids` is set, every candidate is checked against the
    /// low-id threshold before the first call, so a violation touches nothing.
    #[instrument(level = "debug", skip(self, exclude), fields(exclude = %exclude))]
    pub async fn destroy_all(
        &self,
        exclude: &ExcludeSet,
        allow_low_ids: bool,
    ) -> Result<BatchReport, CoreError> {
        let (candidates, skipped) = self.partition(exclude);

        if !allow_low_ids {
            let threshold = self.orchestrator.context().config().low_id_threshold;
            if let Some(entry) = candidates.iter().find(|e| e.id().get() < threshold) {
                return Err(CoreError::SafetyGuard {
                    id: entry.id(),
                    threshold,
                });
            }
        }

        let mut report = BatchReport {
            skipped,
            ..BatchReport::default()
        };
        for entry in candidates {
            let id = entry.id();
            if !self.orchestrator.stop(id).await {
                return Err(failed(OperationKind::Stop, entry));
            }
            if !self.orchestrator.destroy(id).await {
                return Err(failed(OperationKind::Destroy, entry));
            }
            report.processed.push(id);
        }
        info!(destroyed = report.processed.len(), skipped = report.skipped.len(), "destroy batch finished");
        Ok(report)
    }

    #[instrument(level = "debug", skip(self, exclude, description), fields(exclude = %exclude))]
    pub async fn snapshot_create_all(
        &self,
        exclude: &ExcludeSet,
        name: &str,
        description: &str,
    ) -> Result<BatchReport, CoreError> {
        let (candidates, skipped) = self.partition(exclude);
        let mut report = BatchReport {
            skipped,
            ..BatchReport::default()
        };
        for entry in candidates {
            if !self.orchestrator.snapshot_create(entry.id(), name, description).await {
                return Err(failed(OperationKind::SnapshotCreate, entry));
            }
            report.processed.push(entry.id());
        }
        info!(snapshot = name, created = report.processed.len(), "snapshot batch finished");
        Ok(report)
    }

    #[instrument(level = "debug", skip(self, exclude), fields(exclude = %exclude))]
    pub async fn snapshot_delete_all(
        &self,
        exclude: &ExcludeSet,
        name: &str,
    ) -> Result<BatchReport, CoreError> {
        let (candidates, skipped) = self.partition(exclude);
        let mut report = BatchReport {
            skipped,
            ..BatchReport::default()
        };
        for entry in candidates {
            if !self.orchestrator.snapshot_delete(entry.id(), name).await {
                return Err(failed(OperationKind::SnapshotDelete, entry));
            }
            report.processed.push(entry.id());
        }
        info!(snapshot = name, deleted = report.processed.len(), "snapshot delete batch finished");
        Ok(report)
    }

    /// Split the cache into candidates and excluded ids, both ascending.
    fn partition(&self, exclude: &ExcludeSet) -> (Vec<&'a ContainerEntry>, Vec<ContainerId>) {
        let mut candidates = Vec::new();
        let mut skipped = Vec::new();
        for entry in self.orchestrator.cache().iter() {
            if exclude.contains(entry.id()) {
                skipped.push(entry.id());
            } else {
                candidates.push(entry);
            }
        }
        (candidates, skipped)
    }
}

fn failed(op: OperationKind, entry: &ContainerEntry) -> CoreError {
    CoreError::OperationFailed {
        op,
        id: entry.id(),
        name: entry.name().unwrap_or_default().to_string(),
    }
}
