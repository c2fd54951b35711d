mod mode;
pub use mode::BackupMode;

mod operation;
pub use operation::{OperationKind, OperationRequest};
