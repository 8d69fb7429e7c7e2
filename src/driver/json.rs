//! JSON-Lines file driver
//!
//! Each entry becomes one self-contained JSON object on its own line:
//!
//! ```json
//! {"message":"x","level":"INFO","tags":{"transaction_id":"child"},"timestamp":"...","transaction_id":"root","sub_transaction_id":"child"}
//! ```
//!
//! For sub-transactions `transaction_id` names the parent and
//! `sub_transaction_id` the entry's own transaction, matching the
//! `[Transaction parent] -> [SubTransaction child]` text layout.

use super::rotate::{RotatingFile, RotationPolicy};
use super::timestamp_format;
use crate::config::DriverConfig;
use crate::constants::JSON_TIMESTAMP_FORMAT;
use crate::entry::{LogEntry, LogLevel, Tags};
use crate::error::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// One line of a JSON log file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonLogLine {
    pub message: String,
    pub level: LogLevel,
    pub tags: Tags,
    pub timestamp: String,
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_transaction_id: Option<String>,
}

impl JsonLogLine {
    pub fn from_entry(entry: &LogEntry, timestamp_format: &str) -> Self {
        let (transaction_id, sub_transaction_id) = if entry.has_parent() {
            (
                entry.parent_transaction_id().to_string(),
                Some(entry.transaction_id().to_string()),
            )
        } else {
            (entry.transaction_id().to_string(), None)
        };

        Self {
            message: entry.message().to_string(),
            level: entry.level(),
            tags: entry.tags().clone(),
            timestamp: entry.timestamp().format(timestamp_format).to_string(),
            transaction_id,
            sub_transaction_id,
        }
    }
}

/// Appends JSON-Lines entries to a rotated file
#[derive(Debug)]
pub struct JsonFileDriver {
    file: Mutex<RotatingFile>,
    timestamp_format: String,
}

impl JsonFileDriver {
    /// Open (or create) `cfg.log_file_path`
    pub fn new(cfg: &DriverConfig) -> Result<Self> {
        let file = RotatingFile::open(&cfg.log_file_path, RotationPolicy::from_config(cfg))?;
        Ok(Self {
            file: Mutex::new(file),
            timestamp_format: timestamp_format(&cfg.timestamp_format, JSON_TIMESTAMP_FORMAT),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.file.lock().path().to_path_buf()
    }

    pub fn log(&self, entry: &LogEntry) {
        let line = JsonLogLine::from_entry(entry, &self.timestamp_format);
        let json = match serde_json::to_string(&line) {
            Ok(json) => json,
            Err(e) => {
                warn!("Cannot serialize log entry: {}", e);
                return;
            }
        };

        if let Err(e) = self.file.lock().write_line(&json) {
            warn!("Dropped JSON log entry: {}", e);
        }
    }

    pub fn close(&self) -> Result<()> {
        self.file.lock().close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn driver_in(dir: &tempfile::TempDir) -> (JsonFileDriver, PathBuf) {
        let path = dir.path().join("app-json.log");
        let driver = JsonFileDriver::new(&DriverConfig::file(path.to_string_lossy())).unwrap();
        (driver, path)
    }

    fn read_lines(path: &PathBuf) -> Vec<JsonLogLine> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let (driver, path) = driver_in(&dir);

        let mut tags = Tags::new();
        tags.insert("env".to_string(), "test".to_string());
        tags.insert("transaction_id".to_string(), "tx-1".to_string());
        driver.log(
            &LogEntry::new(LogLevel::Warning, "careful")
                .with_tags(tags.clone())
                .with_transaction("tx-1", ""),
        );

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, "careful");
        assert_eq!(lines[0].level, LogLevel::Warning);
        assert_eq!(lines[0].tags, tags);
        assert_eq!(lines[0].transaction_id, "tx-1");
        assert_eq!(lines[0].sub_transaction_id, None);
    }

    #[test]
    fn test_json_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let (driver, path) = driver_in(&dir);

        driver.log(&LogEntry::new(LogLevel::Debug, "one"));
        driver.log(&LogEntry::new(LogLevel::Error, "two"));
        driver.close().unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].message, "one");
        assert_eq!(lines[1].level, LogLevel::Error);
    }

    #[test]
    fn test_json_sub_transaction_fields() {
        let dir = tempfile::tempdir().unwrap();
        let (driver, path) = driver_in(&dir);

        driver.log(&LogEntry::new(LogLevel::Info, "nested").with_transaction("child", "root"));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"sub_transaction_id\":\"child\""));
        let lines = read_lines(&path);
        assert_eq!(lines[0].transaction_id, "root");
        assert_eq!(lines[0].sub_transaction_id.as_deref(), Some("child"));
    }

    #[test]
    fn test_json_omits_sub_transaction_for_root() {
        let entry = LogEntry::new(LogLevel::Info, "root only").with_transaction("root", "");
        let json = serde_json::to_string(&JsonLogLine::from_entry(&entry, "%s")).unwrap();
        assert!(!json.contains("sub_transaction_id"));
        assert!(json.contains("\"level\":\"INFO\""));
    }

    #[test]
    fn test_json_key_order() {
        let entry = LogEntry::new(LogLevel::Info, "m");
        let json = serde_json::to_string(&JsonLogLine::from_entry(&entry, "%s")).unwrap();
        let order = ["\"message\"", "\"level\"", "\"tags\"", "\"timestamp\"", "\"transaction_id\""];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
