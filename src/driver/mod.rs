//! Output drivers
//!
//! A driver renders or stores one `LogEntry` per call. The set of drivers is
//! closed:
//! - `Console` - human-readable lines on stdout
//! - `Text` - the same layout appended to a rotated file
//! - `Json` - JSON-Lines appended to a rotated file
//! - `Mock` - in-memory list for tests
//!
//! `log` never fails: write errors are reported through `tracing` and the
//! entry is dropped. `close` is uniform; it flushes stdout for the console
//! and is a no-op for the mock.

pub mod console;
pub mod json;
pub mod mock;
pub mod rotate;
pub mod text;

pub use console::ConsoleDriver;
pub use json::{JsonFileDriver, JsonLogLine};
pub use mock::MockDriver;
pub use rotate::{Backup, RotatingFile, RotationPolicy};
pub use text::TextFileDriver;

use crate::config::Config;
use crate::entry::LogEntry;
use crate::error::Result;
use chrono::format::{Item, StrftimeItems};
use std::fmt;
use tracing::warn;

/// Driver variant, as named in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Console,
    Text,
    Json,
    Mock,
}

impl DriverKind {
    /// Resolve a config name; anything unknown is the console
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "json" => Self::Json,
            "mock" => Self::Mock,
            _ => Self::Console,
        }
    }

    /// Name used in config files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Console => "cli",
            Self::Text => "text",
            Self::Json => "json",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The active output sink of a `LogManager`
#[derive(Debug)]
pub enum Driver {
    Console(ConsoleDriver),
    Text(TextFileDriver),
    Json(JsonFileDriver),
    Mock(MockDriver),
}

impl Driver {
    /// Build the driver named `name` from its block in `config`
    ///
    /// Unknown names give the console driver. File drivers fail when their
    /// file cannot be opened.
    pub fn from_name(name: &str, config: &Config) -> Result<Self> {
        Self::from_kind(DriverKind::from_name(name), config)
    }

    pub fn from_kind(kind: DriverKind, config: &Config) -> Result<Self> {
        let drivers = &config.drivers;
        Ok(match kind {
            DriverKind::Console => Self::Console(ConsoleDriver::new(&drivers.cli)),
            DriverKind::Text => Self::Text(TextFileDriver::new(&drivers.text)?),
            DriverKind::Json => Self::Json(JsonFileDriver::new(&drivers.json)?),
            DriverKind::Mock => Self::Mock(MockDriver::new()),
        })
    }

    pub fn kind(&self) -> DriverKind {
        match self {
            Self::Console(_) => DriverKind::Console,
            Self::Text(_) => DriverKind::Text,
            Self::Json(_) => DriverKind::Json,
            Self::Mock(_) => DriverKind::Mock,
        }
    }

    pub fn log(&self, entry: &LogEntry) {
        match self {
            Self::Console(d) => d.log(entry),
            Self::Text(d) => d.log(entry),
            Self::Json(d) => d.log(entry),
            Self::Mock(d) => d.log(entry),
        }
    }

    /// Flush and release any file handle
    pub fn close(&self) -> Result<()> {
        match self {
            Self::Console(d) => d.close(),
            Self::Text(d) => d.close(),
            Self::Json(d) => d.close(),
            Self::Mock(_) => Ok(()),
        }
    }

    pub fn as_mock(&self) -> Option<&MockDriver> {
        match self {
            Self::Mock(d) => Some(d),
            _ => None,
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::Console(ConsoleDriver::default())
    }
}

impl From<ConsoleDriver> for Driver {
    fn from(d: ConsoleDriver) -> Self {
        Self::Console(d)
    }
}

impl From<TextFileDriver> for Driver {
    fn from(d: TextFileDriver) -> Self {
        Self::Text(d)
    }
}

impl From<JsonFileDriver> for Driver {
    fn from(d: JsonFileDriver) -> Self {
        Self::Json(d)
    }
}

impl From<MockDriver> for Driver {
    fn from(d: MockDriver) -> Self {
        Self::Mock(d)
    }
}

/// Validated chrono format, or `fallback` when empty or malformed
pub(crate) fn timestamp_format(configured: &str, fallback: &str) -> String {
    if configured.is_empty() {
        return fallback.to_string();
    }
    if StrftimeItems::new(configured).any(|item| matches!(item, Item::Error)) {
        warn!(
            "Invalid timestamp format '{}', using '{}'",
            configured, fallback
        );
        return fallback.to_string();
    }
    configured.to_string()
}
