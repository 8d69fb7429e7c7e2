//! Centralized error types for the telemetry facade
//!
//! All fallible operations return `TelemetryError`.
//! Use `Result<T>` as shorthand for `std::result::Result<T, TelemetryError>`.
//!
//! Logging calls themselves never return an error; only construction,
//! configuration and `close` do.

use std::fmt;
use std::path::PathBuf;

/// All telemetry errors
#[derive(Debug)]
pub enum TelemetryError {
    // === Config ===
    /// Config file missing or unreadable
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid JSON for `Config`
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Config file could not be written
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Drivers ===
    /// Failed to open or create a log file
    DriverOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write, rotate or compress a log file
    DriverWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to flush or close a log file
    DriverClose {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TelemetryError {
    /// True for the config family (read, parse, write)
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. } | Self::ConfigParse { .. } | Self::ConfigWrite { .. }
        )
    }

    /// True for driver I/O failures
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            Self::DriverOpen { .. } | Self::DriverWrite { .. } | Self::DriverClose { .. }
        )
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigRead { source, .. }
            | Self::ConfigWrite { source, .. }
            | Self::DriverOpen { source, .. }
            | Self::DriverWrite { source, .. }
            | Self::DriverClose { source, .. } => Some(source),
            Self::ConfigParse { source, .. } => Some(source),
        }
    }
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigRead { path, source } => {
                write!(f, "Cannot read config {}: {}", path.display(), source)
            }
            Self::ConfigParse { path, source } => {
                write!(f, "Invalid config {}: {}", path.display(), source)
            }
            Self::ConfigWrite { path, source } => {
                write!(f, "Cannot write config {}: {}", path.display(), source)
            }
            Self::DriverOpen { path, source } => {
                write!(f, "Cannot open log file {}: {}", path.display(), source)
            }
            Self::DriverWrite { path, source } => {
                write!(f, "Cannot write log file {}: {}", path.display(), source)
            }
            Self::DriverClose { path, source } => {
                write!(f, "Cannot close log file {}: {}", path.display(), source)
            }
        }
    }
}

/// Alias for Result with TelemetryError
pub type Result<T> = std::result::Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_classification() {
        let read = TelemetryError::ConfigRead {
            path: PathBuf::from("config.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(read.is_config_error());
        assert!(!read.is_io_error());

        let open = TelemetryError::DriverOpen {
            path: PathBuf::from("app.log"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(open.is_io_error());
        assert!(!open.is_config_error());
    }

    #[test]
    fn test_display_and_source() {
        let err = TelemetryError::DriverClose {
            path: PathBuf::from("/tmp/app.log"),
            source: std::io::Error::other("flush failed"),
        };
        let text = err.to_string();
        assert!(text.contains("/tmp/app.log"));
        assert!(text.contains("flush failed"));
        assert!(err.source().is_some());
    }
}
