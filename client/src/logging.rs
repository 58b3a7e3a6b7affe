//! Logging setup. Code logs through the `log` macros; this installs a
//! `tracing-subscriber` formatter that also receives those records.

use tracing_subscriber::EnvFilter;

use crate::config::ClientConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured
/// filter. Returns `false` if a subscriber was already installed.
pub fn init_logging(config: &ClientConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
