//! Core logging types: severity levels and the [`Log`] trait.

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Diagnostic detail, hidden unless `MATERIALIZE_LOG=debug`.
    Debug,
    /// Progress information.
    Info,
    /// Something was skipped that the user may want to know about.
    Warn,
    /// An operation failed.
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (console output) and
/// [`BufferedLog`](super::buffered::BufferedLog) (in-memory capture) implement
/// this trait, so the materializer can log without knowing where messages go
/// or whether they are suppressed.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log a debug message.
    fn debug(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);

    /// Log `msg` at `level`.
    fn log(&self, level: Level, msg: &str) {
        match level {
            Level::Debug => self.debug(msg),
            Level::Info => self.info(msg),
            Level::Warn => self.warn(msg),
            Level::Error => self.error(msg),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::BufferedLog;

    #[test]
    fn level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn level_display() {
        assert_eq!(Level::Warn.to_string(), "warn");
        assert_eq!(Level::Error.to_string(), "error");
    }

    #[test]
    fn log_dispatches_by_level() {
        let log = BufferedLog::new();
        log.log(Level::Info, "a");
        log.log(Level::Warn, "b");
        log.log(Level::Error, "c");
        log.log(Level::Debug, "d");
        assert_eq!(log.messages(Level::Info), vec!["a"]);
        assert_eq!(log.messages(Level::Warn), vec!["b"]);
        assert_eq!(log.messages(Level::Error), vec!["c"]);
        assert_eq!(log.messages(Level::Debug), vec!["d"]);
    }
}
