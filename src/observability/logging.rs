//! Structured logging configuration.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor a configured level is present.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter used with `--verbose`.
pub const VERBOSE_FILTER: &str = "triplecull=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from settings.
    ///
    /// Precedence for the filter: `--verbose`, then `RUST_LOG`, then the
    /// configured level, then [`DEFAULT_FILTER`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown format name or an
    /// unparseable level directive.
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Result<Self> {
        let format = match settings.format.as_deref() {
            Some(name) => LogFormat::parse(name)
                .ok_or_else(|| Error::InvalidInput(format!("unknown log format: {name}")))?,
            None => LogFormat::default(),
        };

        let filter = if verbose {
            EnvFilter::new(VERBOSE_FILTER)
        } else if let Ok(filter) = EnvFilter::try_from_default_env() {
            filter
        } else {
            let level = settings.level.as_deref().unwrap_or(DEFAULT_FILTER);
            EnvFilter::try_new(level)
                .map_err(|e| Error::InvalidInput(format!("log level {level:?}: {e}")))?
        };

        Ok(Self {
            format,
            filter,
            file: settings.file.clone(),
        })
    }
}
