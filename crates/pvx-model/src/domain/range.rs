use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ContainerId, ModelError};

/// Half-open id interval `[min, max)` used to build backup exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRange {
    min: u32,
    max: u32,
}

impl ExclusionRange {
    /// Create a range, rejecting `min > max`. `min == max` is a valid empty range.
    pub fn new(min: u32, max: u32) -> Result<Self, ModelError> {
        if min > max {
            return Err(ModelError::Invalid(format!(
                "exclusion range lower bound {min} is above upper bound {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn contains(&self, id: ContainerId) -> bool {
        self.min <= id.get() && id.get() < self.max
    }
}

impl fmt::Display for ExclusionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}
