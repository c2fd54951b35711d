use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ContainerId, ModelError};

/// Set of container ids excluded from a backup job.
///
/// On the wire this is a comma-separated string (`"101,102"`); an empty or
/// missing value is the empty set. Ids are kept sorted and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet(BTreeSet<ContainerId>);

impl ExcludeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ContainerId) -> bool {
        self.0.contains(&id)
    }

    /// Iterate ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ContainerId> + '_ {
        self.0.iter().copied()
    }

    /// Ids from `candidates` that this set does not contain yet.
    pub fn missing<'a, I>(&self, candidates: I) -> BTreeSet<ContainerId>
    where
        I: IntoIterator<Item = &'a ContainerId>,
    {
        candidates
            .into_iter()
            .filter(|id| !self.0.contains(id))
            .copied()
            .collect()
    }

    /// Union with `ids`, returning the merged set.
    ///
    /// The operation only ever adds ids.
    pub fn union<'a, I>(&self, ids: I) -> ExcludeSet
    where
        I: IntoIterator<Item = &'a ContainerId>,
    {
        let mut out = self.0.clone();
        out.extend(ids.into_iter().copied());
        ExcludeSet(out)
    }

    /// Returns `true` if every id of `other` is also in `self`.
    pub fn is_superset(&self, other: &ExcludeSet) -> bool {
        self.0.is_superset(&other.0)
    }
}

impl FromIterator<ContainerId> for ExcludeSet {
    fn from_iter<T: IntoIterator<Item = ContainerId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for ExcludeSet {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<ContainerId>()
                    .map_err(|_| ModelError::InvalidExclude(s.to_string()))
            })
            .collect()
    }
}

impl fmt::Display for ExcludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for ExcludeSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ExcludeSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
