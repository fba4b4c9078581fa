use std::io::IsTerminal;

use serde::Deserialize;

use crate::logger::{error::LoggerError, format::LoggerFormat};

/// Filter directive, e.g. `info` or `rexec_core=debug,info`.
pub const LOG_LEVEL_ENV: &str = "REXEC_LOG";
/// One of `text`, `json`, `journald`.
pub const LOG_FORMAT_ENV: &str = "REXEC_LOG_FORMAT";
/// `true`/`false`; overrides terminal detection.
pub const LOG_COLOR_ENV: &str = "REXEC_LOG_COLOR";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color,
        }
    }
}

impl LoggerConfig {
    /// Defaults overridden by `REXEC_LOG`, `REXEC_LOG_FORMAT` and `REXEC_LOG_COLOR`.
    pub fn from_env() -> Result<Self, LoggerError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, LoggerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
            cfg.level = level;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).filter(|v| !v.trim().is_empty()) {
            cfg.format = format.parse()?;
        }
        if let Some(color) = lookup(LOG_COLOR_ENV) {
            cfg.use_color = match color.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(LoggerError::InvalidEnv {
                        var: LOG_COLOR_ENV,
                        value: color,
                    });
                }
            };
        }
        if cfg.format != LoggerFormat::Text {
            cfg.use_color = false;
        }
        Ok(cfg)
    }
}
