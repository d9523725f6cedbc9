//! Console logging.
//!
//! Every line carries its level tag. Fatal conditions are logged once with a
//! `FATAL:` prefix and end the process on the spot.

use std::fmt::Display;

use tracing::error;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber, filtered by `RUST_LOG` when set.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .try_init();
}

/// Logs `message` and terminates the process with status 1.
pub fn fatal(message: impl Display) -> ! {
    error!("FATAL: {}", message);
    std::process::exit(1)
}
