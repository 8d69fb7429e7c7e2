//! Transactions: correlation ids and scoped tags on top of a `LogManager`.
//!
//! A transaction's tags travel as call tags on every entry it logs; they are
//! never written into the manager's global set, so two transactions on the
//! same manager cannot see each other's tags.

use crate::constants::{TAG_PARENT_TRANSACTION_ID, TAG_TRANSACTION_ID};
use crate::entry::{merge_tags, LogLevel, Tags};
use crate::manager::LogManager;

/// Message logged by `start`
pub const START_MESSAGE: &str = "Transaction started";

/// Message logged by `end`
pub const END_MESSAGE: &str = "Transaction ended";

/// One logical unit of work
///
/// Borrows its manager, which must outlive it. There is no ended state:
/// logging after `end` simply emits another entry.
#[derive(Debug, Clone)]
pub struct Transaction<'a> {
    id: String,
    parent_id: Option<String>,
    tags: Tags,
    manager: &'a LogManager,
}

impl<'a> Transaction<'a> {
    pub fn new(id: impl Into<String>, manager: &'a LogManager) -> Self {
        let mut tx = Self {
            id: id.into(),
            parent_id: None,
            tags: Tags::new(),
            manager,
        };
        tx.seed_identity();
        tx
    }

    /// Child transaction on the same manager, tagged with this one's id
    pub fn sub_transaction(&self, child_id: impl Into<String>) -> Transaction<'a> {
        let mut child = Transaction::new(child_id, self.manager);
        child.parent_id = Some(self.id.clone());
        child.seed_identity();
        child
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn manager(&self) -> &'a LogManager {
        self.manager
    }

    // === Tags ===
    //
    // The identity tags (`transaction_id`, `parent_transaction_id`) are
    // restored after every mutation.

    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
        self.seed_identity();
    }

    pub fn remove_tag(&mut self, key: &str) {
        self.tags.remove(key);
        self.seed_identity();
    }

    /// Replace all tags, keeping the identity tags
    pub fn set_tags(&mut self, tags: Tags) {
        self.tags = tags;
        self.seed_identity();
    }

    /// Drop all tags except the identity tags
    pub fn reset_tags(&mut self) {
        self.tags.clear();
        self.seed_identity();
    }

    fn seed_identity(&mut self) {
        self.tags
            .insert(TAG_TRANSACTION_ID.to_string(), self.id.clone());
        if let Some(parent) = &self.parent_id {
            self.tags
                .insert(TAG_PARENT_TRANSACTION_ID.to_string(), parent.clone());
        }
    }

    // === Logging ===

    /// Log with extra tags for this call only
    ///
    /// `extra` overrides the transaction's tags, except the identity tags.
    pub fn log(&self, level: LogLevel, message: &str, extra: &Tags) {
        if extra.is_empty() {
            self.dispatch(level, message, &self.tags);
            return;
        }

        let mut tags = merge_tags(&self.tags, extra);
        tags.insert(TAG_TRANSACTION_ID.to_string(), self.id.clone());
        if let Some(parent) = &self.parent_id {
            tags.insert(TAG_PARENT_TRANSACTION_ID.to_string(), parent.clone());
        }
        self.dispatch(level, message, &tags);
    }

    fn dispatch(&self, level: LogLevel, message: &str, tags: &Tags) {
        self.manager.log(
            level,
            message,
            self.parent_id.as_deref().unwrap_or_default(),
            &self.id,
            tags,
        );
    }

    pub fn debug(&self, message: &str) {
        self.dispatch(LogLevel::Debug, message, &self.tags);
    }

    pub fn info(&self, message: &str) {
        self.dispatch(LogLevel::Info, message, &self.tags);
    }

    pub fn warning(&self, message: &str) {
        self.dispatch(LogLevel::Warning, message, &self.tags);
    }

    pub fn error(&self, message: &str) {
        self.dispatch(LogLevel::Error, message, &self.tags);
    }

    pub fn start(&self) {
        self.info(START_MESSAGE);
    }

    pub fn end(&self) {
        self.info(END_MESSAGE);
    }
}
