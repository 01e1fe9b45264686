//! In-memory logger that records every message for later inspection.
use std::sync::Mutex;

use super::types::{Level, Log};

/// A single buffered log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header.
    Stage(String),
    /// A leveled message.
    Message(Level, String),
}

/// Logger that buffers entries in memory instead of writing them anywhere.
///
/// Used by tests to assert on what the materializer reported, and by
/// embedders that want to present the messages themselves.
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLog {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: LogEntry) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(entry);
        }
    }

    /// Return a copy of every entry recorded so far, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Return the messages recorded at exactly `level`, in order.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Message(l, msg) if l == level => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// Return `true` if any message at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }

    /// Replay every buffered entry, in order, to another logger.
    pub fn replay(&self, log: &dyn Log) {
        for entry in self.entries() {
            match entry {
                LogEntry::Stage(msg) => log.stage(&msg),
                LogEntry::Message(level, msg) => log.log(level, &msg),
            }
        }
    }
}

impl Log for BufferedLog {
    fn stage(&self, msg: &str) {
        self.push(LogEntry::Stage(msg.to_string()));
    }

    fn debug(&self, msg: &str) {
        self.push(LogEntry::Message(Level::Debug, msg.to_string()));
    }

    fn info(&self, msg: &str) {
        self.push(LogEntry::Message(Level::Info, msg.to_string()));
    }

    fn warn(&self, msg: &str) {
        self.push(LogEntry::Message(Level::Warn, msg.to_string()));
    }

    fn error(&self, msg: &str) {
        self.push(LogEntry::Message(Level::Error, msg.to_string()));
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let log = BufferedLog::new();
        log.stage("Materializing");
        log.info("one");
        log.warn("two");
        assert_eq!(
            log.entries(),
            vec![
                LogEntry::Stage("Materializing".to_string()),
                LogEntry::Message(Level::Info, "one".to_string()),
                LogEntry::Message(Level::Warn, "two".to_string()),
            ]
        );
    }

    #[test]
    fn contains_matches_substring_at_level() {
        let log = BufferedLog::new();
        log.error("install failed in node_modules/a");
        assert!(log.contains(Level::Error, "node_modules/a"));
        assert!(!log.contains(Level::Warn, "node_modules/a"));
    }

    #[test]
    fn replay_preserves_order() {
        let source = BufferedLog::new();
        source.stage("s");
        source.error("e");
        source.debug("d");
        let sink = BufferedLog::new();
        source.replay(&sink);
        assert_eq!(sink.entries(), source.entries());
    }
}
