// Logging setup for hud-feed

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use super::config::LoggingSettings;

// Writer guards flush buffered lines on drop; they live until exit
static LOG_GUARD: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Plain-text layer over a non-blocking writer
fn plain_layer<S>(writer: NonBlocking) -> Layer<S, DefaultFields, Format, NonBlocking> {
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
}

/// `rolling::never` appender for `path`, if it names a file in a directory
fn file_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    let parent = path.parent()?;
    let file_name = path.file_name()?.to_str()?;
    let appender = tracing_appender::rolling::never(parent, file_name);
    Some(tracing_appender::non_blocking(appender))
}

/// Initialize logging from the `[logging]` section.
///
/// # Arguments
/// * `settings` - `console = true` writes to stdout
/// * `log_file_path` - already resolved `log_file`, if any
///
/// `RUST_LOG` overrides the default INFO level. Calling it twice keeps the
/// first subscriber.
pub fn init_logging(settings: &LoggingSettings, log_file_path: Option<PathBuf>) {
    let mut guards = Vec::new();

    let filter = EnvFilter::builder()
        .with_default_directive(Directive::from(Level::INFO))
        .from_env_lossy();

    let file_layer = log_file_path.as_deref().and_then(file_writer).map(|(writer, guard)| {
        guards.push(guard);
        plain_layer(writer)
    });

    let console_layer = settings.console.then(|| {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);
        plain_layer(writer)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    let _ = LOG_GUARD.set(guards);
}
