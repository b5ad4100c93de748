//! `tracing` subscriber setup.
//!
//! The storage backends only emit events; applications that want to see them
//! install a subscriber once at startup.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize a compact, human readable subscriber writing to stderr.
///
/// Respects `RUST_LOG`. Returns false if a global subscriber was already set.
pub fn init_logging_default() -> bool {
    fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init()
        .is_ok()
}

/// Initialize a subscriber emitting one JSON object per event on stdout.
///
/// Respects `RUST_LOG`. Returns false if a global subscriber was already set.
pub fn init_logging_json() -> bool {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init()
        .is_ok()
}
