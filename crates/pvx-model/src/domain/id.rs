use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Cluster-wide numeric container identifier (`vmid`).
///
/// Always positive; zero is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ContainerId(u32);

impl ContainerId {
    /// Create an id, rejecting zero.
    pub fn new(raw: u32) -> Result<Self, ModelError> {
        if raw == 0 {
            return Err(ModelError::InvalidContainerId(raw.to_string()));
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Parse an id from a string that must round-trip exactly.
    ///
    /// `"101"` is accepted, `"0101"` and `" 101"` are not. Used where ids are
    /// embedded in file names and a loose parse would match the wrong container.
    pub fn parse_exact(s: &str) -> Option<Self> {
        let id: ContainerId = s.parse().ok()?;
        (id.to_string() == s).then_some(id)
    }

    /// Parse a colon-separated id list such as `6002:6003`.
    ///
    /// Empty segments are ignored so `""` yields an empty list.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, ModelError> {
        s.split(':')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl TryFrom<u32> for ContainerId {
    type Error = ModelError;
    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl TryFrom<u64> for ContainerId {
    type Error = ModelError;
    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        let raw = u32::try_from(raw).map_err(|_| ModelError::InvalidContainerId(raw.to_string()))?;
        Self::new(raw)
    }
}

impl From<ContainerId> for u32 {
    fn from(id: ContainerId) -> Self {
        id.0
    }
}

impl FromStr for ContainerId {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u32 = s
            .trim()
            .parse()
            .map_err(|_| ModelError::InvalidContainerId(s.to_string()))?;
        Self::new(raw)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
