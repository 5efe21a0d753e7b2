// ABOUTME: Library half of the Planboard binary: configuration, logging and the HTTP server
// ABOUTME: The planboard executable in src/bin wires these to its subcommands

pub mod config;
pub mod server;

pub use config::{Config, ConfigError};
pub use server::run_server;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .compact()
        .try_init();
}
