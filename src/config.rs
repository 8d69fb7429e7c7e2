//! Configuration management
//!
//! Config is a JSON file (default `config.json` in the working directory)
//! selecting the default driver and carrying one settings block per driver:
//!
//! ```json
//! {
//!   "default_driver": "text",
//!   "drivers": {
//!     "cli":  { "timestamp_format": "%a, %d %b %Y %H:%M:%S %z" },
//!     "text": { "log_file_path": "app-text.log", "max_size": 10, "max_backups": 5, "max_age": 30 },
//!     "json": { "log_file_path": "app-json.log", "max_size": 10, "max_backups": 5, "max_age": 30 }
//!   }
//! }
//! ```

use crate::constants::{
    CONSOLE_TIMESTAMP_FORMAT, DEFAULT_DRIVER, DEFAULT_JSON_LOG_PATH, DEFAULT_MAX_AGE_DAYS,
    DEFAULT_MAX_BACKUPS, DEFAULT_MAX_SIZE_MB, DEFAULT_TEXT_LOG_PATH, RFC3339_TIMESTAMP_FORMAT,
};
use crate::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// =============================================================================
// Driver Configuration
// =============================================================================

/// Settings for one driver
///
/// Read-only once handed to a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Output file (ignored by the console driver)
    pub log_file_path: String,
    /// Rotate once the file exceeds this size, in megabytes (0 = 100 MB)
    pub max_size: u64,
    /// Rotated files to keep (0 = keep all)
    pub max_backups: usize,
    /// Delete rotated files older than this many days (0 = never)
    pub max_age: u64,
    /// chrono strftime format for rendered timestamps (empty = driver default)
    pub timestamp_format: String,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            log_file_path: String::new(),
            max_size: DEFAULT_MAX_SIZE_MB,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age: DEFAULT_MAX_AGE_DAYS,
            timestamp_format: RFC3339_TIMESTAMP_FORMAT.to_string(),
            compress: true,
        }
    }
}

impl DriverConfig {
    /// Defaults for a file driver writing to `path`
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
            ..Self::default()
        }
    }
}

/// Per-driver settings blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriversConfig {
    pub cli: DriverConfig,
    pub text: DriverConfig,
    pub json: DriverConfig,
}

impl Default for DriversConfig {
    fn default() -> Self {
        Self {
            cli: DriverConfig {
                timestamp_format: CONSOLE_TIMESTAMP_FORMAT.to_string(),
                ..DriverConfig::default()
            },
            text: DriverConfig::file(DEFAULT_TEXT_LOG_PATH),
            json: DriverConfig::file(DEFAULT_JSON_LOG_PATH),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_driver: String,
    pub drivers: DriversConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_driver: DEFAULT_DRIVER.to_string(),
            drivers: DriversConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a JSON file
    ///
    /// Missing keys are filled from defaults; a missing file or malformed
    /// JSON is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TelemetryError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| TelemetryError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save config as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_pretty_json(path.as_ref(), self)
    }
}

/// Serialize and write; both failures are write errors
fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let write_error = |source| TelemetryError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    };
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| write_error(io::Error::other(e)))?;
    fs::write(path, content).map_err(write_error)
}

/// Write the default config to `path` unless a valid one is already there
///
/// Returns `true` when defaults were written. A malformed file is replaced.
pub fn ensure_default_config(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match Config::load(path) {
        Ok(_) => Ok(false),
        Err(e) => {
            if path.exists() {
                warn!("Replacing unusable config: {}", e);
            } else {
                debug!("Creating default config at {}", path.display());
            }
            Config::default().save(path)?;
            Ok(true)
        }
    }
}

// =============================================================================
// Config Sources
// =============================================================================

/// Anything that can produce a `Config` on demand
pub trait ConfigSource {
    fn read_config(&self) -> Result<Config>;
}

/// Config backed by a JSON file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_CONFIG_FILE)
    }
}

impl ConfigSource for ConfigFile {
    fn read_config(&self) -> Result<Config> {
        Config::load(&self.path)
    }
}

impl ConfigSource for Config {
    fn read_config(&self) -> Result<Config> {
        Ok(self.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
