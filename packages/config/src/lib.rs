// ABOUTME: Configuration surface shared by the Planboard binary and its adapters
// ABOUTME: Environment variable names, defaults and a lookup that ignores blank values

pub mod constants;

pub use constants::*;

use tracing::debug;

/// Read an environment variable, treating unset and blank values alike.
pub fn env_value(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            debug!("Using {} from environment", name);
            Some(value.trim().to_string())
        }
        _ => None,
    }
}
