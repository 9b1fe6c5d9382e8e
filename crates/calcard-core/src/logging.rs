use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// ## Summary
/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// the configured level.
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed");
    }
}
