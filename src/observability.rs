//! Tracing setup

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Initialize the global tracing subscriber: JSON output, filtered by the
/// configured log level (`RUST_LOG` still wins when set). Call once at
/// startup; later calls are ignored.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.service.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init();
}
