//! Log entry types
//!
//! Core types passed from the manager to a driver: the severity level,
//! the tag map and the immutable entry itself.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tag set: unique keys, last write wins, rendered in key order
pub type Tags = BTreeMap<String, String>;

/// Merge `overrides` on top of `base`; keys present in both take the override
pub fn merge_tags(base: &Tags, overrides: &Tags) -> Tags {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Severity level, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Fixed uppercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// A single log record
///
/// Built once per log call and never mutated afterwards; drivers only
/// get a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    message: String,
    level: LogLevel,
    tags: Tags,
    timestamp: DateTime<Local>,
    transaction_id: String,
    parent_transaction_id: String,
}

impl LogEntry {
    /// Entry stamped with the current time, no tags, no transaction
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            tags: Tags::new(),
            timestamp: Local::now(),
            transaction_id: String::new(),
            parent_transaction_id: String::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Attach transaction ids (empty string = none)
    pub fn with_transaction(
        mut self,
        transaction_id: impl Into<String>,
        parent_transaction_id: impl Into<String>,
    ) -> Self {
        self.transaction_id = transaction_id.into();
        self.parent_transaction_id = parent_transaction_id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Empty when the entry was logged outside a transaction
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Empty for root transactions
    pub fn parent_transaction_id(&self) -> &str {
        &self.parent_transaction_id
    }

    pub fn has_parent(&self) -> bool {
        !self.parent_transaction_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
        assert_eq!(LogLevel::Info.to_string(), "INFO");
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_level_serde_uses_labels() {
        let json = serde_json::to_string(&LogLevel::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let parsed: LogLevel = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(parsed, LogLevel::Error);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_merge_override_wins() {
        let base = tags(&[("env", "prod"), ("region", "eu")]);
        let call = tags(&[("env", "test")]);

        let merged = merge_tags(&base, &call);
        assert_eq!(merged.get("env").map(String::as_str), Some("test"));
        assert_eq!(merged.get("region").map(String::as_str), Some("eu"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_entry_builder() {
        let entry = LogEntry::new(LogLevel::Info, "hello")
            .with_tags(tags(&[("k", "v")]))
            .with_transaction("child", "root");

        assert_eq!(entry.message(), "hello");
        assert_eq!(entry.level(), LogLevel::Info);
        assert_eq!(entry.transaction_id(), "child");
        assert_eq!(entry.parent_transaction_id(), "root");
        assert!(entry.has_parent());
        assert_eq!(entry.tags().len(), 1);
    }

    #[test]
    fn test_entry_defaults_have_no_transaction() {
        let entry = LogEntry::new(LogLevel::Debug, "x");
        assert_eq!(entry.transaction_id(), "");
        assert!(!entry.has_parent());
        assert!(entry.tags().is_empty());
    }
}
