//! Log manager: global tags, timestamping and dispatch to the active driver.
//!
//! # Locking
//!
//! The global tag set and the active driver each sit behind their own
//! `RwLock`, so a `LogManager` can be shared by reference (or `Arc`) across
//! threads without external synchronization:
//! - `log` snapshots the tags under a read lock, releases it, then calls the
//!   driver under a read lock; concurrent log calls do not block each other
//!   here (file drivers serialize internally).
//! - `set_driver*` / `reload_config` take the write lock, so a swap waits for
//!   in-flight calls and every entry lands on exactly one driver.

use crate::config::{Config, ConfigSource};
use crate::driver::{ConsoleDriver, Driver, DriverKind};
use crate::entry::{merge_tags, LogEntry, LogLevel, Tags};
use crate::error::Result;
use parking_lot::RwLock;
use std::mem;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct LogManager {
    driver: RwLock<Driver>,
    tags: RwLock<Tags>,
}

impl LogManager {
    /// Manager using the driver named `selector` (`cli`, `text`, `json`)
    ///
    /// Never fails: unknown names (including `mock`) and drivers whose file
    /// cannot be opened fall back to the console.
    pub fn new(selector: &str, config: &Config) -> Self {
        let driver = Driver::from_kind(configured_kind(selector), config).unwrap_or_else(|e| {
            warn!("Falling back to console driver: {}", e);
            Driver::Console(ConsoleDriver::new(&config.drivers.cli))
        });
        Self::with_driver(driver)
    }

    /// Manager using `config.default_driver`
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.default_driver, config)
    }

    pub fn with_driver(driver: impl Into<Driver>) -> Self {
        Self {
            driver: RwLock::new(driver.into()),
            tags: RwLock::new(Tags::new()),
        }
    }

    // === Driver ===

    /// Install `driver`, returning the previous one
    ///
    /// The previous driver is not closed; call `close` on it (or drop it) when
    /// its output should be released.
    pub fn set_driver(&self, driver: impl Into<Driver>) -> Driver {
        let driver = driver.into();
        let new_kind = driver.kind();
        let previous = mem::replace(&mut *self.driver.write(), driver);
        debug!("Driver switched: {} -> {}", previous.kind(), new_kind);
        previous
    }

    /// Build the named driver from `config` and install it
    ///
    /// On failure the current driver stays active.
    pub fn set_driver_by_name(&self, name: &str, config: &Config) -> Result<Driver> {
        let driver = Driver::from_name(name, config)?;
        Ok(self.set_driver(driver))
    }

    /// Re-read configuration and install its default driver
    ///
    /// Selection follows `new`. Nothing changes when the source cannot be
    /// read or the driver cannot be built.
    pub fn reload_config<S>(&self, source: &S) -> Result<Driver>
    where
        S: ConfigSource + ?Sized,
    {
        let config = source.read_config()?;
        let driver = Driver::from_kind(configured_kind(&config.default_driver), &config)?;
        Ok(self.set_driver(driver))
    }

    pub fn driver_kind(&self) -> DriverKind {
        self.driver.read().kind()
    }

    /// Run `f` against the active driver
    pub fn inspect_driver<R>(&self, f: impl FnOnce(&Driver) -> R) -> R {
        f(&*self.driver.read())
    }

    /// Close the active driver
    pub fn close(&self) -> Result<()> {
        self.driver.read().close()
    }

    // === Global tags ===

    pub fn add_tag(&self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.write().insert(key.into(), value.into());
    }

    pub fn remove_tag(&self, key: &str) -> Option<String> {
        self.tags.write().remove(key)
    }

    /// Replace all global tags
    pub fn set_tags(&self, tags: Tags) {
        *self.tags.write() = tags;
    }

    pub fn reset_tags(&self) {
        self.tags.write().clear();
    }

    /// Snapshot of the global tags
    pub fn tags(&self) -> Tags {
        self.tags.read().clone()
    }

    // === Logging ===

    /// Merge global and call tags (call tags win), stamp and dispatch
    pub fn log(
        &self,
        level: LogLevel,
        message: &str,
        parent_id: &str,
        transaction_id: &str,
        call_tags: &Tags,
    ) {
        let tags = merge_tags(&self.tags.read(), call_tags);
        let entry = LogEntry::new(level, message)
            .with_tags(tags)
            .with_transaction(transaction_id, parent_id);

        self.driver.read().log(&entry);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, "", "", &Tags::new());
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, "", "", &Tags::new());
    }

    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message, "", "", &Tags::new());
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, "", "", &Tags::new());
    }
}

/// Driver named in configuration; the mock is only installed explicitly
fn configured_kind(selector: &str) -> DriverKind {
    match DriverKind::from_name(selector) {
        DriverKind::Mock => {
            warn!("Driver 'mock' cannot be selected from configuration, using console");
            DriverKind::Console
        }
        kind => kind,
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::with_driver(Driver::default())
    }
}
