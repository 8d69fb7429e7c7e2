//! Size-rotated log file with count and age retention.
//!
//! The active file is always `log_file_path`. When the next line would push it
//! past the size limit, it is renamed to `<stem>-<UTC timestamp><ext>`,
//! optionally gzipped, and a fresh file is opened in its place. Backups beyond
//! `max_backups` or older than `max_age` days are deleted after each rotation.
//!
//! Writes are unbuffered: every line reaches the OS in a single `write_all`.

use crate::config::DriverConfig;
use crate::constants::{
    BACKUP_TIME_FORMAT, BYTES_PER_MB, COMPRESSED_SUFFIX, FALLBACK_MAX_SIZE_MB,
};
use crate::error::{Result, TelemetryError};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Length of a rendered `BACKUP_TIME_FORMAT` timestamp
const BACKUP_TIME_LEN: usize = "2006-01-02T15-04-05.000".len();

/// When to rotate and what to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    /// 0 = keep all
    pub max_backups: usize,
    /// 0 = never expire
    pub max_age_days: u64,
    pub compress: bool,
}

impl RotationPolicy {
    pub fn from_config(cfg: &DriverConfig) -> Self {
        let max_mb = if cfg.max_size == 0 {
            FALLBACK_MAX_SIZE_MB
        } else {
            cfg.max_size
        };
        Self {
            max_bytes: max_mb.saturating_mul(BYTES_PER_MB),
            max_backups: cfg.max_backups,
            max_age_days: cfg.max_age,
            compress: cfg.compress,
        }
    }

    fn max_age(&self) -> Option<Duration> {
        if self.max_age_days == 0 {
            None
        } else {
            // Cap keeps the conversion far from chrono's overflow panic
            Some(Duration::days(self.max_age_days.min(1_000_000) as i64))
        }
    }
}

/// A rotated-out file found next to the active one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
    pub rotated_at: DateTime<Utc>,
}

/// Append-only file with rotation
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    file: Option<File>,
    size: u64,
    policy: RotationPolicy,
    /// Set by `close`; a handle lost during rotation is reopened instead
    closed: bool,
}

impl RotatingFile {
    /// Open (or create) the active file in append mode
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| TelemetryError::DriverOpen {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }

        let (file, size) = open_append(&path).map_err(|e| TelemetryError::DriverOpen {
            path: path.clone(),
            source: e,
        })?;

        Ok(Self {
            path,
            file: Some(file),
            size,
            policy,
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written to the active file
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Append `line` plus a newline, rotating first if it would not fit
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        if self.closed {
            return Err(closed_error(&self.path));
        }
        if self.file.is_none() {
            self.reopen()?;
        }

        let len = line.len() as u64 + 1;
        if self.size > 0 && self.size.saturating_add(len) > self.policy.max_bytes {
            if let Err(e) = self.rotate() {
                warn!("Log rotation failed: {}", e);
            }
        }

        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let file = self.file.as_mut().ok_or_else(|| closed_error(&self.path))?;
        file.write_all(buf.as_bytes())
            .map_err(|e| TelemetryError::DriverWrite {
                path: self.path.clone(),
                source: e,
            })?;
        self.size = self.size.saturating_add(len);
        Ok(())
    }

    /// Move the active file aside and start a new one
    ///
    /// The active file is reopened even when the rename fails, so logging
    /// keeps going into the oversized file.
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        let backup = next_backup_path(&self.path, Utc::now());
        let renamed = fs::rename(&self.path, &backup);

        self.reopen()?;

        renamed.map_err(|e| TelemetryError::DriverWrite {
            path: backup.clone(),
            source: e,
        })?;
        debug!("Rotated {} -> {}", self.path.display(), backup.display());

        if self.policy.compress {
            match compress_file(&backup) {
                Ok(gz) => debug!("Compressed {}", gz.display()),
                Err(e) => warn!("Failed to compress {}: {}", backup.display(), e),
            }
        }

        self.prune();
        Ok(())
    }

    /// (Re)open the active file in append mode
    fn reopen(&mut self) -> Result<()> {
        let (file, size) = open_append(&self.path).map_err(|e| TelemetryError::DriverOpen {
            path: self.path.clone(),
            source: e,
        })?;
        debug!("Reopened {}", self.path.display());
        self.file = Some(file);
        self.size = size;
        Ok(())
    }

    /// Rotated files for this path, newest first
    pub fn backups(&self) -> Vec<Backup> {
        list_backups(&self.path).unwrap_or_else(|e| {
            warn!("Cannot list backups of {}: {}", self.path.display(), e);
            Vec::new()
        })
    }

    fn prune(&self) {
        let cutoff = self.policy.max_age().map(|age| Utc::now() - age);

        for (i, backup) in self.backups().iter().enumerate() {
            let over_count = self.policy.max_backups > 0 && i >= self.policy.max_backups;
            let expired = cutoff.is_some_and(|c| backup.rotated_at < c);
            if !over_count && !expired {
                continue;
            }
            match fs::remove_file(&backup.path) {
                Ok(()) => debug!("Removed old log file: {}", backup.path.display()),
                Err(e) => warn!("Failed to remove {}: {}", backup.path.display(), e),
            }
        }
    }

    /// Flush and release the handle; later writes fail until reopened
    pub fn close(&mut self) -> Result<()> {
        self.closed = true;
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        file.flush()
            .and_then(|_| file.sync_all())
            .map_err(|e| TelemetryError::DriverClose {
                path: self.path.clone(),
                source: e,
            })
    }
}

fn closed_error(path: &Path) -> TelemetryError {
    TelemetryError::DriverWrite {
        path: path.to_path_buf(),
        source: io::Error::other("log file is closed"),
    }
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// `dir/app-text.log` -> (`app-text-`, `.log`)
fn backup_affixes(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "log".to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (format!("{}-", stem), ext)
}

fn backup_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
    let (prefix, ext) = backup_affixes(path);
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}{}{}", prefix, at.format(BACKUP_TIME_FORMAT), ext))
}

/// Backup name strictly newer than every existing backup of `path`
fn next_backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let newest = list_backups(path)
        .ok()
        .and_then(|b| b.first().map(|b| b.rotated_at));
    let at = match newest {
        Some(t) if t >= now => t + Duration::milliseconds(1),
        _ => now,
    };

    let mut candidate = backup_path(path, at);
    let mut bump = 1;
    // Two rotations within the same millisecond
    while candidate.exists() || with_suffix(&candidate, COMPRESSED_SUFFIX).exists() {
        candidate = backup_path(path, at + Duration::milliseconds(bump));
        bump += 1;
    }
    candidate
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// Parse the rotation time out of a backup file name
fn parse_backup_name(name: &str, prefix: &str, ext: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(prefix)?;
    let rest = rest.strip_suffix(COMPRESSED_SUFFIX).unwrap_or(rest);
    let stamp = rest.strip_suffix(ext)?;
    if stamp.len() != BACKUP_TIME_LEN {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

fn list_backups(path: &Path) -> io::Result<Vec<Backup>> {
    let (prefix, ext) = backup_affixes(path);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut backups: Vec<Backup> = fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            let rotated_at = parse_backup_name(&name, &prefix, &ext)?;
            Some(Backup {
                path: e.path(),
                rotated_at,
            })
        })
        .collect();

    backups.sort_by(|a, b| b.rotated_at.cmp(&a.rotated_at));
    Ok(backups)
}

/// Gzip `path` into `path.gz` and remove the original
fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let gz_path = with_suffix(path, COMPRESSED_SUFFIX);

    let mut input = File::open(path)?;
    let output = File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    let written = io::copy(&mut input, &mut encoder).and_then(|_| encoder.finish());
    if let Err(e) = written {
        let _ = fs::remove_file(&gz_path);
        return Err(e);
    }

    fs::remove_file(path)?;
    Ok(gz_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn policy(max_bytes: u64, max_backups: usize, compress: bool) -> RotationPolicy {
        RotationPolicy {
            max_bytes,
            max_backups,
            max_age_days: 0,
            compress,
        }
    }

    #[test]
    fn test_policy_from_config() {
        let cfg = DriverConfig {
            max_size: 2,
            max_backups: 3,
            max_age: 7,
            ..DriverConfig::default()
        };
        let p = RotationPolicy::from_config(&cfg);
        assert_eq!(p.max_bytes, 2 * 1024 * 1024);
        assert_eq!(p.max_backups, 3);
        assert_eq!(p.max_age_days, 7);

        let zero = RotationPolicy::from_config(&DriverConfig {
            max_size: 0,
            ..DriverConfig::default()
        });
        assert_eq!(zero.max_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");

        let file = RotatingFile::open(&path, policy(1024, 0, false)).unwrap();
        assert!(path.exists());
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn test_open_appends_to_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "existing\n").unwrap();

        let mut file = RotatingFile::open(&path, policy(1024, 0, false)).unwrap();
        assert_eq!(file.size(), 9);
        file.write_line("next").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nnext\n");
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, policy(20, 0, false)).unwrap();

        file.write_line("0123456789").unwrap(); // 11 bytes
        file.write_line("abcdefghij").unwrap(); // would reach 22 -> rotate first

        assert_eq!(fs::read_to_string(&path).unwrap(), "abcdefghij\n");
        let backups = file.backups();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "0123456789\n");
    }

    #[test]
    fn test_oversized_line_on_empty_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, policy(4, 0, false)).unwrap();

        file.write_line("longer than four bytes").unwrap();
        assert!(file.backups().is_empty());
        assert_eq!(file.size(), 23);
    }

    #[test]
    fn test_keeps_max_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, policy(8, 2, false)).unwrap();

        for i in 0..6 {
            file.write_line(&format!("line-{}", i)).unwrap();
        }

        let backups = file.backups();
        assert_eq!(backups.len(), 2);
        // Newest backup holds the line before the active one
        assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "line-4\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "line-5\n");
    }

    #[test]
    fn test_compresses_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, policy(8, 0, true)).unwrap();

        file.write_line("first").unwrap();
        file.write_line("second").unwrap();

        let backups = file.backups();
        assert_eq!(backups.len(), 1);
        let name = backups[0].path.to_string_lossy().to_string();
        assert!(name.ends_with(".log.gz"), "unexpected backup {}", name);

        let mut decoded = String::new();
        GzDecoder::new(File::open(&backups[0].path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "first\n");
    }

    #[test]
    fn test_prunes_expired_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let old = backup_path(&path, Utc::now() - Duration::days(10));
        fs::write(&old, "old\n").unwrap();
        let recent = backup_path(&path, Utc::now() - Duration::hours(1));
        fs::write(&recent, "recent\n").unwrap();

        let mut file = RotatingFile::open(
            &path,
            RotationPolicy {
                max_bytes: 3,
                max_backups: 0,
                max_age_days: 3,
                compress: false,
            },
        )
        .unwrap();
        file.write_line("a").unwrap();
        file.write_line("b").unwrap();

        assert!(!old.exists());
        assert!(recent.exists());
        assert_eq!(file.backups().len(), 2);
    }

    #[test]
    fn test_parse_backup_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        let path = Path::new("/var/log/app-text.log");
        let backup = backup_path(path, at);
        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, "app-text-2024-03-01T12-30-45.000.log");

        assert_eq!(parse_backup_name(&name, "app-text-", ".log"), Some(at));
        assert_eq!(
            parse_backup_name(&format!("{}.gz", name), "app-text-", ".log"),
            Some(at)
        );
        assert_eq!(parse_backup_name("app-text.log", "app-text-", ".log"), None);
        assert_eq!(parse_backup_name("app-text-other.log", "app-text-", ".log"), None);
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, policy(1024, 0, false)).unwrap();

        file.close().unwrap();
        assert!(file.is_closed());
        // Second close is a no-op
        file.close().unwrap();

        let err = file.write_line("late").unwrap_err();
        assert!(matches!(err, TelemetryError::DriverWrite { .. }));
    }

    #[test]
    fn test_failed_compression_leaves_no_partial_archive() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory fails after the archive has been created
        let backup = dir.path().join("app-2024-03-01T12-30-45.000.log");
        fs::create_dir(&backup).unwrap();

        assert!(compress_file(&backup).is_err());
        assert!(!with_suffix(&backup, COMPRESSED_SUFFIX).exists());
        assert!(backup.exists());
    }

    #[test]
    fn test_lost_handle_is_reopened_on_next_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, policy(1024, 0, false)).unwrap();
        file.write_line("before").unwrap();

        // As left by a rotation whose reopen failed
        file.file = None;
        assert!(!file.is_closed());

        file.write_line("after").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "before\nafter\n");
        assert_eq!(file.size(), 13);
    }
}
