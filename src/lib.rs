//! Tagged telemetry - a small structured-logging facade
//!
//! - `LogManager` - global tags, timestamps, dispatch to the active driver
//! - `Transaction` - correlation ids and scoped tags, with sub-transactions
//! - `Driver` - console, rotated text file, rotated JSON-Lines file, mock
//! - `Config` - JSON config selecting and configuring drivers
//!
//! ```no_run
//! use tagged_telemetry::{ensure_default_config, Config, LogManager, Transaction};
//!
//! ensure_default_config("config.json")?;
//! let config = Config::load("config.json")?;
//! let manager = LogManager::from_config(&config);
//! manager.add_tag("service", "billing");
//!
//! let mut tx = Transaction::new("a3124", &manager);
//! tx.add_tag("customer", "42");
//! tx.start();
//! tx.sub_transaction("charge").info("charging card");
//! tx.end();
//! manager.close()?;
//! # Ok::<(), tagged_telemetry::TelemetryError>(())
//! ```

pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod driver;
pub mod entry;
pub mod error;
pub mod manager;
pub mod transaction;

pub use config::{ensure_default_config, Config, ConfigFile, ConfigSource, DriverConfig, DriversConfig};
pub use driver::{
    ConsoleDriver, Driver, DriverKind, JsonFileDriver, JsonLogLine, MockDriver, TextFileDriver,
};
pub use entry::{merge_tags, LogEntry, LogLevel, Tags};
pub use error::{Result, TelemetryError};
pub use manager::LogManager;
pub use transaction::Transaction;
