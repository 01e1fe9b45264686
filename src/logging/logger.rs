//! Console logger with output suppression.
use super::subscriber::STAGE_TARGET;
use super::types::Log;

/// Implement the methods of [`Log`] by delegating to inherent methods of the
/// same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Console logger backed by [`tracing`].
///
/// When constructed silent every message is dropped before it reaches the
/// subscriber, errors included.  Formatting and routing (stdout vs. stderr)
/// are handled by the subscriber installed with
/// [`init_subscriber`](super::subscriber::init_subscriber).
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    silent: bool,
}

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub const fn new(silent: bool) -> Self {
        Self { silent }
    }

    /// Whether this logger suppresses all output.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        self.silent
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        if !self.silent {
            tracing::error!("{msg}");
        }
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        if !self.silent {
            tracing::warn!("{msg}");
        }
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        if !self.silent {
            tracing::info!(target: STAGE_TARGET, "{msg}");
        }
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        if !self.silent {
            tracing::info!("{msg}");
        }
    }

    /// Log a debug message (hidden on the console unless enabled through
    /// [`LOG_ENV_VAR`](super::subscriber::LOG_ENV_VAR)).
    pub fn debug(&self, msg: &str) {
        if !self.silent {
            tracing::debug!("{msg}");
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, debug, info, warn, error);
}
