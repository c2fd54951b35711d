//! Well-known wire tokens used across the model layer.

/// Resource type tag of an LXC container in the cluster resource list.
pub const CONTAINER_TYPE: &str = "lxc";

/// Exit-status token reported by the cluster for a successfully finished task.
///
/// Any other exit status (including `WARNINGS: n`) is treated as a failure.
pub const EXIT_OK: &str = "OK";

/// Name of the pseudo-snapshot that represents the live container state.
pub const SNAPSHOT_CURRENT: &str = "current";
