use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::error::LoggerResult;
use crate::logger::{LoggerFormat, LoggerLevel, LoggerTimeZone};

pub const ENV_LOG_LEVEL: &str = "PVX_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "PVX_LOG_FORMAT";
pub const ENV_LOG_TZ: &str = "PVX_LOG_TZ";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Filter expression (e.g. `info`, `pvx_core=debug,info`).
    pub level: LoggerLevel,
    /// Timezone of timestamps.
    pub tz: LoggerTimeZone,
    /// Include module/target names in log output.
    pub with_targets: bool,
    /// Colored output; only honoured when stderr is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: false,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Defaults overridden by `PVX_LOG_LEVEL`, `PVX_LOG_FORMAT` and `PVX_LOG_TZ`.
    pub fn from_env() -> LoggerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LoggerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> LoggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            cfg.level = level.parse()?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT).filter(|v| !v.trim().is_empty()) {
            cfg.format = format.parse()?;
        }
        if let Some(tz) = lookup(ENV_LOG_TZ).filter(|v| !v.trim().is_empty()) {
            cfg.tz = tz.parse()?;
        }
        Ok(cfg)
    }

    /// Color is used only if enabled and stderr is a terminal.
    ///
    /// Evaluated at install time, not at parse time.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stderr().is_terminal()
    }
}
