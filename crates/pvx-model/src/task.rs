use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EXIT_OK;

/// Opaque handle of an asynchronous cluster task (a Proxmox UPID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(upid: impl Into<String>) -> Self {
        Self(upid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a cluster task.
///
/// The cluster reports either a bare phase token (`running`) or, once the
/// task is done, `phase:exitstatus` (`stopped:OK`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Running { phase: String },
    Finished { phase: String, exit: String },
}

impl TaskState {
    /// Parse the `phase` / `phase:exit` form. Only the first `:` separates,
    /// exit statuses such as `command 'x' failed: exit code 1` stay intact.
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((phase, exit)) => TaskState::Finished {
                phase: phase.to_string(),
                exit: exit.to_string(),
            },
            None => TaskState::Running {
                phase: s.to_string(),
            },
        }
    }

    /// Build a state from the separate `status` and `exitstatus` fields of the API.
    pub fn from_parts(status: &str, exitstatus: Option<&str>) -> Self {
        match exitstatus {
            Some(exit) => TaskState::Finished {
                phase: status.to_string(),
                exit: exit.to_string(),
            },
            None => TaskState::Running {
                phase: status.to_string(),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Finished { .. })
    }

    /// Returns `true` only for a terminal state whose exit status is exactly [`EXIT_OK`].
    pub fn succeeded(&self) -> bool {
        matches!(self, TaskState::Finished { exit, .. } if exit == EXIT_OK)
    }

    pub fn exit(&self) -> Option<&str> {
        match self {
            TaskState::Finished { exit, .. } => Some(exit),
            TaskState::Running { .. } => None,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Running { phase } => f.write_str(phase),
            TaskState::Finished { phase, exit } => write!(f, "{phase}:{exit}"),
        }
    }
}

/// One line of a task log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Line number, unique and increasing within a task.
    #[serde(rename = "n")]
    pub sequence: u64,
    #[serde(rename = "t", default)]
    pub text: String,
}

impl LogEntry {
    pub fn new(sequence: u64, text: impl Into<String>) -> Self {
        Self {
            sequence,
            text: text.into(),
        }
    }
}
