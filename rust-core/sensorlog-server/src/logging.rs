//! Tracing subscriber setup.

use crate::config::{LogFormat, LoggingSection};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// A second call is a no-op, so tests may call this freely.
pub fn init_tracing(settings: &LoggingSection) {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(&settings.level));
    let _ = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}
