//! Console driver and the human-readable entry layout shared with the text
//! file driver.

use super::timestamp_format;
use crate::config::DriverConfig;
use crate::constants::{CONSOLE_TIMESTAMP_FORMAT, RESERVED_TIMESTAMP_TAG};
use crate::entry::LogEntry;
use crate::error::{Result, TelemetryError};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::warn;

/// Separator between level and body on the console
pub(crate) const CONSOLE_SEPARATOR: &str = " - ";

/// Separator between level and body in text files
pub(crate) const TEXT_SEPARATOR: &str = ": ";

/// Render an entry as a header line plus one indented line per tag
///
/// ```text
/// [2024-03-01T12:00:00+00:00] INFO - [Transaction root] -> [SubTransaction child] message
///   env: prod
/// ```
pub(crate) fn render_text(entry: &LogEntry, timestamp_format: &str, separator: &str) -> String {
    let mut out = format!(
        "[{}] {}{}",
        entry.timestamp().format(timestamp_format),
        entry.level(),
        separator
    );

    if entry.has_parent() {
        out.push_str(&format!(
            "[Transaction {}] -> [SubTransaction {}] ",
            entry.parent_transaction_id(),
            entry.transaction_id()
        ));
    } else if !entry.transaction_id().is_empty() {
        out.push_str(&format!("[Transaction {}] ", entry.transaction_id()));
    }
    out.push_str(entry.message());

    for (key, value) in entry.tags() {
        if key == RESERVED_TIMESTAMP_TAG {
            continue;
        }
        out.push_str(&format!("\n  {}: {}", key, value));
    }
    out
}

/// Writes entries to standard output
#[derive(Debug, Clone)]
pub struct ConsoleDriver {
    timestamp_format: String,
}

impl ConsoleDriver {
    pub fn new(cfg: &DriverConfig) -> Self {
        Self {
            timestamp_format: timestamp_format(&cfg.timestamp_format, CONSOLE_TIMESTAMP_FORMAT),
        }
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    pub fn log(&self, entry: &LogEntry) {
        let text = render_text(entry, &self.timestamp_format, CONSOLE_SEPARATOR);

        // Hold the lock for the whole entry so tag lines stay attached
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            warn!("Dropped console log entry: {}", e);
        }
    }

    pub fn close(&self) -> Result<()> {
        io::stdout()
            .flush()
            .map_err(|e| TelemetryError::DriverClose {
                path: PathBuf::from("<stdout>"),
                source: e,
            })
    }
}

impl Default for ConsoleDriver {
    fn default() -> Self {
        Self {
            timestamp_format: CONSOLE_TIMESTAMP_FORMAT.to_string(),
        }
    }
}
