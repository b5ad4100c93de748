//! Storage Backend Abstraction
//!
//! This module provides a trait-based abstraction for the layer that persists
//! a document database. The database reads the whole document set, mutates it
//! in memory and writes it back; a backend only has to store one value.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   Document layer    │
//! │  (tables, queries)  │
//! └──────────┬──────────┘
//!            │
//! ┌──────────▼──────────┐
//! │       Storage       │  <-- Trait
//! │   (synchronous)     │
//! └──────────┬──────────┘
//!            │
//!     ┌──────┴──────┬─────────────┐
//!     │             │             │
//! ┌───▼───┐   ┌─────▼─────┐  ┌────▼────┐
//! │ JSON  │   │  Memory   │  │ Custom  │
//! │ file  │   │           │  │ backend │
//! └───────┘   └───────────┘  └─────────┘
//! ```
//!
//! All operations are blocking and run on the caller's thread. No backend
//! locks its resource: keeping a single writer per file is up to the caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docstore::storage::{MemoryStorage, Storage, StorageBuilder};
//! use serde_json::json;
//!
//! fn example() -> docstore::storage::StorageResult<()> {
//!     let mut storage = StorageBuilder::new("json")
//!         .with_path("data/db.json")
//!         .with_option("indent", "2")
//!         .build()?;
//!
//!     storage.write(&json!({"_default": {"1": {"name": "ada"}}}))?;
//!     let data = storage.read()?;
//!     storage.close()?;
//!
//!     let mut scratch = MemoryStorage::new();
//!     scratch.write(&data.unwrap_or_default())?;
//!     Ok(())
//! }
//! ```

mod access_mode;
mod encoding;
mod errors;
mod json;
mod memory;
mod touch;
mod traits;

pub use access_mode::AccessMode;
pub use encoding::TextEncoding;
pub use errors::{StorageError, StorageResult};
pub use json::{JsonFormat, JsonStorage, JsonStorageOptions, StorageWarning};
pub use memory::MemoryStorage;
pub use touch::touch;
pub use traits::*;
