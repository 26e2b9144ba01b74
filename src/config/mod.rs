//! Configuration management.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, or the platform config directory)
//! 3. Environment variables (`TRIPLECULL_SCRATCH_DIR`, `TRIPLECULL_LOG_FORMAT`,
//!    `TRIPLECULL_LOG_LEVEL`)
//!
//! Command-line flags are applied on top by the binary.
//!
//! ```toml
//! [router]
//! progress_interval = 1000000
//! extra_blocked_predicates = ["<http://rdf.freebase.com/ns/common.topic.official_website>"]
//!
//! [sort]
//! chunk_bytes = 268435456
//! merge_fan_in = 64
//! scratch_dir = "/var/tmp/triplecull"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! file = "/var/log/triplecull.log"
//! ```

use crate::router::{DEFAULT_PROGRESS_INTERVAL, FilterPolicy, TripleRouter};
use crate::sort::{DEFAULT_CHUNK_BYTES, DEFAULT_MERGE_FAN_IN, ExternalSort};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the scratch directory.
pub const ENV_SCRATCH_DIR: &str = "TRIPLECULL_SCRATCH_DIR";
/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "TRIPLECULL_LOG_FORMAT";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "TRIPLECULL_LOG_LEVEL";

/// Main configuration for triplecull.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TripleCullConfig {
    /// Router settings.
    pub router: RouterConfig,
    /// Sort settings.
    pub sort: SortConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Router settings.
#[derive(Debug, Clone, Serialize)]
pub struct RouterConfig {
    /// Lines between progress reports.
    pub progress_interval: NonZeroU64,
    /// Predicates blocked in addition to the built-in list.
    pub extra_blocked_predicates: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            extra_blocked_predicates: Vec::new(),
        }
    }
}

/// Sort settings.
#[derive(Debug, Clone, Serialize)]
pub struct SortConfig {
    /// In-memory chunk budget in bytes.
    pub chunk_bytes: NonZeroUsize,
    /// Runs merged at once.
    pub merge_fan_in: usize,
    /// Directory for scratch files (system temp dir when unset).
    pub scratch_dir: Option<PathBuf>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            merge_fan_in: DEFAULT_MERGE_FAN_IN,
            scratch_dir: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`).
    pub level: Option<String>,
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Router section.
    pub router: Option<ConfigFileRouter>,
    /// Sort section.
    pub sort: Option<ConfigFileSort>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Router section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileRouter {
    /// Progress interval.
    pub progress_interval: Option<u64>,
    /// Extra blocked predicates.
    pub extra_blocked_predicates: Option<Vec<String>>,
}

/// Sort section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileSort {
    /// Chunk budget in bytes.
    pub chunk_bytes: Option<usize>,
    /// Merge fan-in.
    pub merge_fan_in: Option<usize>,
    /// Scratch directory.
    pub scratch_dir: Option<String>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Level directive.
    pub level: Option<String>,
    /// Format name.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl TripleCullConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds
    /// out-of-range values.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for unparseable text or out-of-range values.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| Error::InvalidInput(format!("config file: {e}")))?;
        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/triplecull/` on macOS)
    /// 2. XDG config dir (`~/.config/triplecull/`)
    ///
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("triplecull").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("triplecull")
                .join("config.toml"),
        ];
        for path in &candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `TripleCullConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(router) = file.router {
            if let Some(interval) = router.progress_interval {
                config.router.progress_interval = NonZeroU64::new(interval).ok_or_else(|| {
                    Error::InvalidInput("router.progress_interval must be positive".to_string())
                })?;
            }
            if let Some(predicates) = router.extra_blocked_predicates {
                config.router.extra_blocked_predicates = predicates;
            }
        }
        if let Some(sort) = file.sort {
            if let Some(bytes) = sort.chunk_bytes {
                config.sort.chunk_bytes = NonZeroUsize::new(bytes).ok_or_else(|| {
                    Error::InvalidInput("sort.chunk_bytes must be positive".to_string())
                })?;
            }
            if let Some(fan_in) = sort.merge_fan_in {
                if fan_in < 2 {
                    return Err(Error::InvalidInput(
                        "sort.merge_fan_in must be at least 2".to_string(),
                    ));
                }
                config.sort.merge_fan_in = fan_in;
            }
            config.sort.scratch_dir = sort.scratch_dir.map(PathBuf::from);
        }
        if let Some(logging) = file.logging {
            config.logging.level = logging.level;
            config.logging.format = logging.format;
            config.logging.file = logging.file.map(PathBuf::from);
        }

        Ok(config)
    }

    /// Applies environment variable overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = non_empty(ENV_SCRATCH_DIR) {
            self.sort.scratch_dir = Some(PathBuf::from(dir));
        }
        if let Some(format) = non_empty(ENV_LOG_FORMAT) {
            self.logging.format = Some(format);
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = Some(level);
        }
        self
    }

    /// Sets the scratch directory.
    #[must_use]
    pub fn with_scratch_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sort.scratch_dir = Some(path.into());
        self
    }

    /// Returns the scratch directory, falling back to the system temp dir.
    #[must_use]
    pub fn scratch_dir(&self) -> PathBuf {
        self.sort
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Builds the filter policy, including configured extra predicates.
    #[must_use]
    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy::freebase().with_blocked_predicates(&self.router.extra_blocked_predicates)
    }

    /// Builds a router from the router settings.
    #[must_use]
    pub fn triple_router(&self) -> TripleRouter {
        TripleRouter::new(self.filter_policy())
            .with_progress_interval(self.router.progress_interval)
    }

    /// Builds an external sort from the sort settings.
    #[must_use]
    pub fn external_sort(&self) -> ExternalSort {
        ExternalSort::new(self.scratch_dir())
            .with_chunk_bytes(self.sort.chunk_bytes)
            .with_merge_fan_in(self.sort.merge_fan_in)
    }
}
