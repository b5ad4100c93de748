//! Configuration management for storage backends.
//!
//! Storage settings are read from a TOML file with a single `[storage]` table.
//!
//! # Example
//!
//! ```no_run
//! use docstore::config::ConfigurationLoader;
//! use docstore::storage::Storage;
//! use std::path::Path;
//!
//! let loader = ConfigurationLoader::new(Some(Path::new("config/docstore.toml"))).unwrap();
//! let mut storage = loader.open_storage().unwrap();
//!
//! println!("Backend: {}", storage.backend_type());
//! println!("Data: {:?}", storage.read().unwrap());
//! ```

#[allow(clippy::module_inception)]
pub mod config;

// Re-export main types for convenience
pub use self::config::{Configuration, ConfigurationLoader, StorageConfig};
