//! Logging infrastructure for console output.
//!
//! Library code logs through the [`Log`] trait.  The binary uses [`Logger`],
//! which forwards to [`tracing`] and drops everything when constructed
//! silent; tests use [`BufferedLog`] to capture messages in memory.

mod buffered;
mod logger;
mod subscriber;
mod types;

pub use buffered::{BufferedLog, LogEntry};
pub use logger::Logger;
pub use subscriber::{LOG_ENV_VAR, init_subscriber};
pub use types::{Level, Log};

/// Run `f` with a thread-local subscriber that captures every event as
/// `(level, target, message)`.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn capture_events(f: impl FnOnce()) -> Vec<(tracing::Level, String, String)> {
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt as _;

    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(subscriber::CaptureLayer {
        events: Arc::clone(&events),
    });
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().expect("capture lock poisoned").clone();
    captured
}
