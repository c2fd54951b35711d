use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ExcludeSet;

/// Cluster-wide scheduled backup job (`cluster/backup`).
///
/// Only `starttime` and `exclude` are interpreted; every other field is kept
/// verbatim in `extra` so a job can be shown or re-serialized without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupJob {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starttime: Option<String>,
    #[serde(default, skip_serializing_if = "ExcludeSet::is_empty")]
    pub exclude: ExcludeSet,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl BackupJob {
    /// All fields as a key-sorted map, for display.
    pub fn fields(&self) -> BTreeMap<String, serde_json::Value> {
        let mut out = self.extra.clone();
        out.insert("id".into(), self.id.clone().into());
        if let Some(st) = &self.starttime {
            out.insert("starttime".into(), st.clone().into());
        }
        if !self.exclude.is_empty() {
            out.insert("exclude".into(), self.exclude.to_string().into());
        }
        out
    }
}

/// Body of a backup job update: the fields the exclusion merge rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupJobUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starttime: Option<String>,
    #[serde(default)]
    pub exclude: ExcludeSet,
}
