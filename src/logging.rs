//! Tracing subscriber initialization
//!
//! Logs go to stderr; stdout is reserved for the account CSV.

use crate::cli::LogFormat;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `level` when set. An unparseable `level` falls back
/// to `info`. Safe to call multiple times (subsequent calls are no-ops).
pub fn init(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Pretty => builder.with_target(true).try_init(),
        LogFormat::Json => builder.json().with_target(false).try_init(),
    };
}
