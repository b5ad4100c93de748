//! docstore - Pluggable storage backends for a lightweight document database
//!
//! A document database built on docstore keeps its whole dataset in one
//! [`DocumentSet`](storage::DocumentSet): it reads it, mutates it in memory,
//! and writes it back through a [`Storage`](storage::Storage) backend.
//!
//! - **`storage`** - The `Storage` trait, the JSON file and in-memory backends,
//!   and the `touch` helper (always enabled)
//! - **`config`** - TOML configuration of the storage backend
//! - **`observability`** - `tracing` subscriber setup
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! docstore = { version = "0.1", features = ["config"] }
//! # Or enable everything:
//! docstore = { version = "0.1", features = ["all"] }
//! ```
//!
//! # Example: JSON file storage
//!
//! ```no_run
//! use docstore::storage::{JsonStorage, JsonStorageOptions, Storage};
//! use serde_json::json;
//!
//! let options = JsonStorageOptions::default().with_indent(2);
//! let mut storage = JsonStorage::with_options("data/db.json", options).unwrap();
//!
//! let mut data = storage.read().unwrap().unwrap_or_else(|| json!({}));
//! data["_default"] = json!({"1": {"name": "ada"}});
//! storage.write(&data).unwrap();
//!
//! storage.close().unwrap();
//! ```
//!
//! # Example: Using the config feature
//!
//! ```ignore
//! use docstore::config::ConfigurationLoader;
//! use std::path::Path;
//!
//! let loader = ConfigurationLoader::new(Some(Path::new("config/docstore.toml"))).unwrap();
//! let mut storage = loader.open_storage().unwrap();
//! ```

#![warn(missing_docs)]

/// Storage trait and backends
pub mod storage;

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Observability utilities (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::storage::{
        touch, AccessMode, DocumentSet, JsonStorage, JsonStorageOptions, MemoryStorage, Storage,
        StorageError, StorageExt, StorageResult, TextEncoding,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{Configuration, ConfigurationLoader};
}
