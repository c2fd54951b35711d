//! One-shot snapshot of the containers known to the cluster.
use std::collections::BTreeMap;

use pvx_model::{ContainerEntry, ContainerId, ExclusionRange, ResourceEntry};
use tracing::{debug, instrument, warn};

use crate::client::{ClientError, ClusterClient};

/// Containers keyed by id, iterated in ascending id order.
///
/// Built once per run and passed by reference; there is no partial refresh.
#[derive(Debug, Clone, Default)]
pub struct ClusterStateCache {
    entries: BTreeMap<ContainerId, ContainerEntry>,
}

impl ClusterStateCache {
    /// Pull the resource list and keep the container entries.
    #[instrument(level = "debug", skip(client))]
    pub async fn refresh(client: &dyn ClusterClient) -> Result<Self, ClientError> {
        let resources = client.cluster_resources().await?;
        let cache = Self::from_resources(&resources);
        debug!(containers = cache.len(), resources = resources.len(), "cluster state loaded");
        Ok(cache)
    }

    /// Build from an already fetched resource list.
    pub fn from_resources(resources: &[ResourceEntry]) -> Self {
        let mut entries = BTreeMap::new();
        for raw in resources {
            let Some(entry) = ContainerEntry::from_resource(raw) else {
                continue;
            };
            if let ContainerEntry::Invalid(invalid) = &entry {
                warn!(id = %invalid.id, missing = invalid.missing, "container record incomplete");
            }
            entries.insert(entry.id(), entry);
        }
        Self { entries }
    }

    pub fn lookup(&self, id: ContainerId) -> Option<&ContainerEntry> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContainerEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ContainerId> + '_ {
        self.entries.keys().copied()
    }

    /// Known ids inside the half-open `range`.
    pub fn ids_in_range(&self, range: &ExclusionRange) -> Vec<ContainerId> {
        self.ids().filter(|id| range.contains(*id)).collect()
    }

    /// First container (lowest id) carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&ContainerEntry> {
        self.iter().find(|e| e.name() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
