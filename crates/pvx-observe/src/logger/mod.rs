mod config;
mod error;
mod format;
mod install;
mod level;
mod timezone;

pub use config::{ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_LOG_TZ, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;
pub use timezone::{LoggerTimeZone, LoggerTimer};

/// Install the global tracing subscriber described by `cfg`.
///
/// Log lines go to stderr so command output on stdout stays machine readable.
/// With [`LoggerTimeZone::Local`] call this before the tokio runtime starts:
/// the local offset can only be detected while the process is single-threaded.
///
/// # Examples
/// ```rust
/// use pvx_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("failed to initialize logger");
///
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => install::text(cfg),
        LoggerFormat::Json => install::json(cfg),
        LoggerFormat::Journald => install::journald(cfg),
    }
}
