//! Crate-wide constants
//!
//! Centralized defaults and reserved names to avoid duplication.

// =============================================================================
// Config
// =============================================================================

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Driver used when the config names none (or an unknown one)
pub const DEFAULT_DRIVER: &str = "cli";

/// Default text driver output
pub const DEFAULT_TEXT_LOG_PATH: &str = "app-text.log";

/// Default JSON driver output
pub const DEFAULT_JSON_LOG_PATH: &str = "app-json.log";

/// Default rotation threshold (megabytes)
pub const DEFAULT_MAX_SIZE_MB: u64 = 10;

/// Default number of rotated files kept
pub const DEFAULT_MAX_BACKUPS: usize = 5;

/// Default retention of rotated files (days)
pub const DEFAULT_MAX_AGE_DAYS: u64 = 30;

// =============================================================================
// Rotation
// =============================================================================

/// Threshold applied when `max_size` is 0
pub const FALLBACK_MAX_SIZE_MB: u64 = 100;

/// Bytes per configured megabyte
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Timestamp embedded in rotated file names (UTC)
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Extension appended to compressed backups
pub const COMPRESSED_SUFFIX: &str = ".gz";

// =============================================================================
// Timestamps
// =============================================================================

/// Console default, RFC 1123 style (`Mon, 02 Jan 2006 15:04:05 +0000`)
pub const CONSOLE_TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// File default, RFC 3339 style
pub const RFC3339_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// JSON default, RFC 3339 with milliseconds
pub const JSON_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

// =============================================================================
// Tags
// =============================================================================

/// Tag seeded into every transaction
pub const TAG_TRANSACTION_ID: &str = "transaction_id";

/// Tag seeded into every sub-transaction
pub const TAG_PARENT_TRANSACTION_ID: &str = "parent_transaction_id";

/// Tag never rendered by text output (entries carry their own timestamp)
pub const RESERVED_TIMESTAMP_TAG: &str = "timestamp";
