//! Logging setup: rolling text and JSON log files plus a compact stdout layer.
//!
//! Outputs:
//! - `<dir>/parser.log` - human-readable text, no ANSI colors
//! - `<dir>/parser.json.log` - structured JSON for later analysis
//! - stdout - compact, for whoever runs the job by hand
//!
//! The level comes from `RUST_LOG` (default: "info"), e.g.
//! `RUST_LOG=vacancy_feed=debug,reqwest=warn`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the background log writers alive; drop it only at process exit.
pub struct LogGuards {
    _text: WorkerGuard,
    _json: WorkerGuard,
}

/// Initialize the global tracing subscriber, creating `log_dir` if needed.
///
/// Fails if the directory cannot be created or a subscriber is already set.
pub fn init_logging<P: AsRef<Path>>(log_dir: P) -> Result<LogGuards, Box<dyn std::error::Error>> {
    let log_path = log_dir.as_ref();
    std::fs::create_dir_all(log_path)?;

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let text_file_appender = tracing_appender::rolling::daily(log_path, "parser.log");
    let (text_writer, text_guard) = tracing_appender::non_blocking(text_file_appender);

    let json_file_appender = tracing_appender::rolling::daily(log_path, "parser.json.log");
    let (json_writer, json_guard) = tracing_appender::non_blocking(json_file_appender);

    let text_layer = fmt::layer()
        .with_writer(text_writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact()
        .with_filter(env_filter.clone());

    let json_layer = fmt::layer()
        .json()
        .with_writer(json_writer)
        .with_target(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(env_filter.clone());

    let stdout_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(stdout_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs will be written to {}", log_path.display());

    Ok(LogGuards {
        _text: text_guard,
        _json: json_guard,
    })
}
