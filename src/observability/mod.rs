//! Observability utilities.
//!
//! Storage backends log through `tracing`: `debug` events for opens, reads,
//! writes and closes, `warn` events for risky configuration. This module
//! installs a `tracing-subscriber` formatter to make them visible.
//!
//! # Example
//!
//! ```no_run
//! use docstore::observability::init_logging_default;
//! use docstore::storage::{JsonStorage, Storage};
//!
//! init_logging_default();
//!
//! let mut storage = JsonStorage::open("data/db.json").unwrap();
//! storage.read().unwrap();
//! ```

pub mod logging;

// Re-export main functions for convenience
pub use logging::{init_logging_default, init_logging_json};
