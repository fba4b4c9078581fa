mod config;
mod error;
mod format;
mod log;

pub use config::{LOG_COLOR_ENV, LOG_FORMAT_ENV, LOG_LEVEL_ENV, LoggerConfig};
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] when called twice in one process.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::text(cfg),
        LoggerFormat::Json => log::json(cfg),
        LoggerFormat::Journald => log::journald(cfg),
    }
}
