//! Bulk edit of backup job exclusion lists.
use std::collections::BTreeSet;
use std::sync::Arc;

use pvx_model::{BackupJobUpdate, ContainerId, ExclusionRange};
use tracing::{debug, info, instrument};

use crate::cache::ClusterStateCache;
use crate::client::ClusterClient;
use crate::context::OpsContext;
use crate::error::CoreError;

/// Ids added to one backup job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobChange {
    pub job: String,
    pub added: BTreeSet<ContainerId>,
}

/// Outcome of one exclusion merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Known ids inside the range.
    pub candidates: Vec<ContainerId>,
    pub updated: Vec<JobChange>,
    /// Jobs that already excluded every candidate.
    pub skipped: Vec<String>,
}

impl MergeReport {
    pub fn is_noop(&self) -> bool {
        self.updated.is_empty()
    }
}

/// Unions an id range into the exclusion set of every backup job.
///
/// The merge only ever adds ids, so running it twice with the same range
/// issues no write the second time.
pub struct ExclusionMerger<'a> {
    client: Arc<dyn ClusterClient>,
    cache: &'a ClusterStateCache,
}

impl<'a> ExclusionMerger<'a> {
    pub fn new(client: Arc<dyn ClusterClient>, cache: &'a ClusterStateCache) -> Self {
        Self { client, cache }
    }

    pub fn from_context(ctx: &OpsContext, cache: &'a ClusterStateCache) -> Self {
        Self::new(ctx.client_handle(), cache)
    }

    #[instrument(level = "debug", skip(self), fields(range = %range))]
    pub async fn exclude_range(&self, range: ExclusionRange) -> Result<MergeReport, CoreError> {
        let candidates = self.cache.ids_in_range(&range);
        let mut report = MergeReport {
            candidates,
            ..MergeReport::default()
        };
        if report.candidates.is_empty() {
            info!(range = %range, "nothing to exclude");
            return Ok(report);
        }

        let jobs = self.client.list_backup_jobs().await?;
        for job in jobs {
            let added = job.exclude.missing(&report.candidates);
            if added.is_empty() {
                debug!(job = %job.id, "backup job already excludes range");
                report.skipped.push(job.id);
                continue;
            }

            let update = BackupJobUpdate {
                starttime: job.starttime.clone(),
                exclude: job.exclude.union(&report.candidates),
            };
            info!(job = %job.id, exclude = %update.exclude, "update backup job exclusions");
            self.client
                .update_backup_job(&job.id, &update)
                .await
                .map_err(|source| CoreError::UpdateRejected {
                    job: job.id.clone(),
                    source,
                })?;
            report.updated.push(JobChange { job: job.id, added });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, FakeCluster, cid};

    fn cluster() -> FakeCluster {
        FakeCluster::new()
            .with_container(150, "n", "a", "running")
            .with_container(950, "n", "b", "running")
            .with_container(999, "n", "c", "running")
            .with_container(1200, "n", "d", "running")
    }

    async fn setup(fake: FakeCluster) -> (Arc<FakeCluster>, ClusterStateCache) {
        let fake = Arc::new(fake);
        let cache = ClusterStateCache::refresh(fake.as_ref()).await.unwrap();
        (fake, cache)
    }

    fn range() -> ExclusionRange {
        ExclusionRange::new(900, 1000).unwrap()
    }

    #[tokio::test]
    async fn merges_missing_ids_and_is_idempotent() {
        let (fake, cache) = setup(cluster().with_job("backup-1", "950")).await;
        let merger = ExclusionMerger::new(fake.clone(), &cache);

        let first = merger.exclude_range(range()).await.unwrap();
        assert_eq!(first.candidates, vec![cid(950), cid(999)]);
        assert_eq!(
            first.updated,
            vec![JobChange {
                job: "backup-1".into(),
                added: [cid(999)].into_iter().collect(),
            }]
        );

        let updates = fake.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.exclude.to_string(), "950,999");
        assert_eq!(updates[0].1.starttime.as_deref(), Some("02:00"));

        let second = merger.exclude_range(range()).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(second.skipped, vec!["backup-1".to_string()]);
        assert_eq!(fake.updates().len(), 1);
    }

    #[tokio::test]
    async fn result_is_superset_of_old_and_candidates() {
        let (fake, cache) = setup(
            cluster()
                .with_job("a", "")
                .with_job("b", "101,102")
                .with_job("c", "999,950,4000"),
        )
        .await;
        let before: Vec<_> = ["a", "b", "c"].iter().map(|j| fake.job(j).unwrap()).collect();

        let report = ExclusionMerger::new(fake.clone(), &cache)
            .exclude_range(range())
            .await
            .unwrap();
        assert_eq!(report.skipped, vec!["c".to_string()]);

        let candidates: pvx_model::ExcludeSet = report.candidates.iter().copied().collect();
        for old in before {
            let new = fake.job(&old.id).unwrap();
            assert!(new.exclude.is_superset(&old.exclude));
            assert!(new.exclude.is_superset(&candidates));
        }
    }

    #[tokio::test]
    async fn empty_candidate_set_fetches_no_jobs() {
        let (fake, cache) = setup(cluster().with_job("backup-1", "")).await;
        let report = ExclusionMerger::new(fake.clone(), &cache)
            .exclude_range(ExclusionRange::new(2000, 3000).unwrap())
            .await
            .unwrap();

        assert!(report.candidates.is_empty());
        assert!(!fake.calls().contains(&Call::ListJobs));
    }

    #[tokio::test]
    async fn rejected_update_is_fatal() {
        let (fake, cache) = setup(
            cluster()
                .with_job("a", "")
                .with_job("b", "")
                .reject_update("a"),
        )
        .await;

        let err = ExclusionMerger::new(fake.clone(), &cache)
            .exclude_range(range())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UpdateRejected { ref job, .. } if job == "a"));
        // jobs are processed in id order, "b" is never reached
        assert_eq!(fake.updates().len(), 1);
    }
}
