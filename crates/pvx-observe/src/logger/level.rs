use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Dependencies (reqwest, hyper, rustls) stay at this level when the
/// operator only names a bare level.
const DEPENDENCY_LEVEL: &str = "warn";

/// Log filter of the `pvx` binary.
///
/// Either a bare level (`debug`), which applies to the `pvx` crates only, or a
/// full `EnvFilter` expression (`pvx_core=trace,reqwest=debug`) used as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        s.into().parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_bare(&self) -> bool {
        !self.0.contains(['=', ',', '['])
    }

    /// Filter directives actually installed.
    pub fn directives(&self) -> String {
        if self.is_bare() {
            format!("{DEPENDENCY_LEVEL},pvx={}", self.0)
        } else {
            self.0.clone()
        }
    }

    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.directives()).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".into())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = Self(s.trim().to_string());
        EnvFilter::try_new(level.directives())
            .map(|_| level)
            .map_err(|e| LoggerError::InvalidLevel(format!("{s}: {e}")))
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
