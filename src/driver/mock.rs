//! In-memory driver for tests.

use crate::entry::LogEntry;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every entry in call order
///
/// Clones share the same list, so a test can keep one handle and give the
/// other to a `LogManager`.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn last(&self) -> Option<LogEntry> {
        self.entries.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogLevel;

    #[test]
    fn test_clones_share_entries() {
        let mock = MockDriver::new();
        let handle = mock.clone();

        mock.log(&LogEntry::new(LogLevel::Info, "a"));
        mock.log(&LogEntry::new(LogLevel::Error, "b"));

        assert_eq!(handle.len(), 2);
        assert_eq!(handle.entries()[0].message(), "a");
        assert_eq!(handle.last().unwrap().level(), LogLevel::Error);

        handle.clear();
        assert!(mock.is_empty());
    }
}
