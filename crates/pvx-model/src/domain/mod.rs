mod id;
pub use id::ContainerId;

mod exclude;
pub use exclude::ExcludeSet;

mod range;
pub use range::ExclusionRange;

mod constants;
pub use constants::{CONTAINER_TYPE, EXIT_OK, SNAPSHOT_CURRENT};
