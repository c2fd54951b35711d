use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{CONTAINER_TYPE, ContainerId, ModelError};

/// Raw entry of the cluster resource list (`cluster/resources?type=vm`).
///
/// The list is heterogeneous (qemu guests, containers, ...); unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Resource type tag (`lxc`, `qemu`, ...).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ResourceEntry {
    /// Returns `true` if the entry is tagged as a container.
    pub fn is_container(&self) -> bool {
        self.kind.as_deref() == Some(CONTAINER_TYPE)
    }
}

/// Run state of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerStatus {
    Running,
    Stopped,
    /// Placeholder state for a restore target that does not exist yet.
    ToBeRecovered,
    /// Any other state reported by the cluster, kept verbatim.
    Other(String),
}

impl ContainerStatus {
    pub fn is_stopped(&self) -> bool {
        matches!(self, ContainerStatus::Stopped)
    }
}

impl FromStr for ContainerStatus {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "to-be-recovered" => Self::ToBeRecovered,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for ContainerStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<ContainerStatus> for String {
    fn from(s: ContainerStatus) -> Self {
        s.to_string()
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerStatus::Running => f.write_str("running"),
            ContainerStatus::Stopped => f.write_str("stopped"),
            ContainerStatus::ToBeRecovered => f.write_str("to-be-recovered"),
            ContainerStatus::Other(s) => f.write_str(s),
        }
    }
}

/// Validated container record: node and status are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: ContainerId,
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: ContainerStatus,
}

impl ContainerRecord {
    /// Synthesize a record for restoring onto an id that may not exist yet.
    pub fn placeholder(id: ContainerId, node: impl Into<String>) -> Self {
        Self {
            id,
            node: node.into(),
            name: None,
            status: ContainerStatus::ToBeRecovered,
        }
    }

    /// Container name, or an empty string when the cluster reports none.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Name required by operations that address the container by name (destroy).
    pub fn require_name(&self) -> Result<&str, ModelError> {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => Ok(n),
            _ => Err(ModelError::PreconditionNotMet {
                id: self.id,
                missing: "name",
            }),
        }
    }
}

/// Container whose raw record lacks a required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidContainer {
    pub id: ContainerId,
    pub name: Option<String>,
    pub missing: &'static str,
}

/// One container slot of the cluster snapshot.
///
/// Validation happens once, when the raw resource list is parsed; every
/// operation on an [`ContainerEntry::Invalid`] entry fails its precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEntry {
    Valid(ContainerRecord),
    Invalid(InvalidContainer),
}

impl ContainerEntry {
    /// Build an entry from a raw resource.
    ///
    /// Returns `None` for non-container resources and entries without a usable id.
    pub fn from_resource(raw: &ResourceEntry) -> Option<Self> {
        if !raw.is_container() {
            return None;
        }
        let id = ContainerId::try_from(raw.vmid?).ok()?;
        let name = raw.name.clone().filter(|n| !n.is_empty());

        let node = raw.node.as_deref().filter(|n| !n.is_empty());
        let status = raw.status.as_deref().filter(|s| !s.is_empty());

        let entry = match (node, status) {
            (Some(node), Some(status)) => ContainerEntry::Valid(ContainerRecord {
                id,
                node: node.to_string(),
                name,
                status: status.to_string().into(),
            }),
            (None, _) => ContainerEntry::Invalid(InvalidContainer {
                id,
                name,
                missing: "node",
            }),
            (Some(_), None) => ContainerEntry::Invalid(InvalidContainer {
                id,
                name,
                missing: "status",
            }),
        };
        Some(entry)
    }

    pub fn id(&self) -> ContainerId {
        match self {
            ContainerEntry::Valid(r) => r.id,
            ContainerEntry::Invalid(i) => i.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ContainerEntry::Valid(r) => r.name.as_deref(),
            ContainerEntry::Invalid(i) => i.name.as_deref(),
        }
    }

    /// Access the validated record or fail with `PreconditionNotMet`.
    pub fn record(&self) -> Result<&ContainerRecord, ModelError> {
        match self {
            ContainerEntry::Valid(r) => Ok(r),
            ContainerEntry::Invalid(i) => Err(ModelError::PreconditionNotMet {
                id: i.id,
                missing: i.missing,
            }),
        }
    }
}
