//! Logging initialization.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Build the log filter: `RUST_LOG` wins, then `configured`, then `info`.
pub fn build_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(configured: Option<&str>) -> bool {
    let filter = build_filter(configured);
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().try_init().is_ok()
}
