//! Text file driver: console layout, written to a rotated file.

use super::console::{render_text, TEXT_SEPARATOR};
use super::rotate::{RotatingFile, RotationPolicy};
use super::timestamp_format;
use crate::config::DriverConfig;
use crate::constants::RFC3339_TIMESTAMP_FORMAT;
use crate::entry::LogEntry;
use crate::error::Result;
use parking_lot::Mutex;
use std::path::PathBuf;
use tracing::warn;

/// Appends human-readable entries to a rotated file
#[derive(Debug)]
pub struct TextFileDriver {
    file: Mutex<RotatingFile>,
    timestamp_format: String,
}

impl TextFileDriver {
    /// Open (or create) `cfg.log_file_path`
    pub fn new(cfg: &DriverConfig) -> Result<Self> {
        let file = RotatingFile::open(&cfg.log_file_path, RotationPolicy::from_config(cfg))?;
        Ok(Self {
            file: Mutex::new(file),
            timestamp_format: timestamp_format(&cfg.timestamp_format, RFC3339_TIMESTAMP_FORMAT),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.file.lock().path().to_path_buf()
    }

    pub fn log(&self, entry: &LogEntry) {
        let text = render_text(entry, &self.timestamp_format, TEXT_SEPARATOR);
        if let Err(e) = self.file.lock().write_line(&text) {
            warn!("Dropped text log entry: {}", e);
        }
    }

    pub fn close(&self) -> Result<()> {
        self.file.lock().close()
    }
}
