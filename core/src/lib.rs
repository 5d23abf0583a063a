pub mod app;
pub mod cli;
pub mod config;
pub mod files;

pub use config::Config;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins when set.
pub fn init_tracing(logging_enabled: bool) {
    let fallback = if logging_enabled { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
