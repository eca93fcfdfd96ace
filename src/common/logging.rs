//! Logging and tracing configuration
//!
//! Console narration of a run goes to stdout; tracing output goes to stderr so
//! the two never interleave in a captured report. An optional log file keeps
//! the full debug trace of driver traffic for post-mortems.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths;

/// Name of the run log inside the log directory
const LOG_FILE_NAME: &str = "scene-check.log";

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init_cli() {
    tracing_subscriber::registry()
        .with(default_filter("scene_check=info,warn"))
        .with(stderr_layer())
        .init();
}

/// Initialize tracing for the CLI plus a debug-level log file
///
/// Returns the log file path and the guard that flushes the file writer; the
/// guard must be held until the process exits. Falls back to stderr-only
/// logging when no log directory is available.
pub fn init_with_file() -> Option<(PathBuf, WorkerGuard)> {
    let Some(log_dir) = paths::log_dir() else {
        init_cli();
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_cli();
        return None;
    }

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(default_filter("scene_check=debug,info"))
        .with(stderr_layer())
        .with(file_layer)
        .init();

    Some((log_dir.join(LOG_FILE_NAME), guard))
}

fn default_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
}
