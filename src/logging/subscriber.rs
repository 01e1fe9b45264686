//! Tracing subscriber setup: console formatter and initialisation.

/// Environment variable holding an [`EnvFilter`](tracing_subscriber::EnvFilter)
/// directive for console output (default `info`).
pub const LOG_ENV_VAR: &str = "MATERIALIZE_LOG";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Target used for stage headers so the formatter can tell them apart from
/// ordinary info lines.
pub(super) const STAGE_TARGET: &str = "materialize::stage";

/// Render one console line (without the trailing newline).
///
/// `ansi` selects between coloured output and plain text for pipes and CI
/// logs.
fn render_line(level: tracing::Level, target: &str, msg: &str, ansi: bool) -> String {
    let stage = level == tracing::Level::INFO && target == STAGE_TARGET;
    match (level, ansi) {
        (tracing::Level::ERROR, true) => format!("\x1b[31mERROR\x1b[0m {msg}"),
        (tracing::Level::ERROR, false) => format!("ERROR {msg}"),
        (tracing::Level::WARN, true) => format!("\x1b[33mWARN\x1b[0m  {msg}"),
        (tracing::Level::WARN, false) => format!("WARN  {msg}"),
        (_, true) if stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
        (_, false) if stage => format!("==> {msg}"),
        (tracing::Level::INFO, _) | (_, false) => format!("  {msg}"),
        (_, true) => format!("  \x1b[2m{msg}\x1b[0m"),
    }
}

/// Console [`FormatEvent`](tracing_subscriber::fmt::FormatEvent): `==>` stage
/// headers, `WARN`/`ERROR` prefixes, and indented info lines.
struct MaterializeFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for MaterializeFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let metadata = event.metadata();
        let line = render_line(
            *metadata.level(),
            metadata.target(),
            &extractor.message,
            writer.has_ansi_escapes(),
        );
        writeln!(writer, "{line}")
    }
}

/// Test layer that records `(level, target, message)` for every event.
#[cfg(test)]
pub(super) struct CaptureLayer {
    pub(super) events: std::sync::Arc<std::sync::Mutex<Vec<(tracing::Level, String, String)>>>,
}

#[cfg(test)]
impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        if let Ok(mut guard) = self.events.lock() {
            guard.push((
                *metadata.level(),
                metadata.target().to_string(),
                extractor.message,
            ));
        }
    }
}

/// Install the global [`tracing`] subscriber for console output.
///
/// Warnings and errors are written to stderr, everything else to stdout.
/// Colour is enabled only when stdout is a terminal.  The level filter comes
/// from [`LOG_ENV_VAR`] and defaults to `info`.  Call once, before logging.
pub fn init_subscriber() {
    use std::io::IsTerminal as _;
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(MaterializeFormatter)
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(make_writer)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}
