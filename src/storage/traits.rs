//! Storage Traits
//!
//! Defines the capability every storage backend provides to the document layer.

use std::collections::HashMap;
use std::path::PathBuf;

use super::errors::{StorageError, StorageResult};
use super::json::{JsonFormat, JsonStorage, JsonStorageOptions};
use super::memory::MemoryStorage;

/// The complete payload exchanged in one `read`/`write` call
///
/// Conventionally a JSON object mapping table names to documents, but the
/// storage layer treats it as opaque.
pub type DocumentSet = serde_json::Value;

/// Core trait for storage backends
///
/// A backend persists exactly one [`DocumentSet`] at a time. The document
/// layer reads the whole set, mutates it, and writes it back.
///
/// Implementations are not expected to coordinate access between several
/// handles on the same underlying resource; callers keep a single writer.
///
/// # Example
///
/// ```rust
/// use docstore::storage::{DocumentSet, Storage, StorageResult};
///
/// #[derive(Default)]
/// struct CountingStorage {
///     data: Option<DocumentSet>,
///     writes: usize,
/// }
///
/// impl Storage for CountingStorage {
///     fn backend_type(&self) -> &'static str {
///         "counting"
///     }
///
///     fn read(&mut self) -> StorageResult<Option<DocumentSet>> {
///         Ok(self.data.clone())
///     }
///
///     fn write(&mut self, data: &DocumentSet) -> StorageResult<()> {
///         self.writes += 1;
///         self.data = Some(data.clone());
///         Ok(())
///     }
/// }
/// ```
pub trait Storage: Send {
    /// Get the backend type name (e.g., "json", "memory")
    fn backend_type(&self) -> &'static str;

    /// Read the stored document set.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn read(&mut self) -> StorageResult<Option<DocumentSet>>;

    /// Replace the stored document set with `data`
    fn write(&mut self, data: &DocumentSet) -> StorageResult<()>;

    /// Release any resources held by the backend.
    ///
    /// Backends without resources keep this default no-op.
    fn close(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }

    fn read(&mut self) -> StorageResult<Option<DocumentSet>> {
        (**self).read()
    }

    fn write(&mut self, data: &DocumentSet) -> StorageResult<()> {
        (**self).write(data)
    }

    fn close(&mut self) -> StorageResult<()> {
        (**self).close()
    }
}

/// Extension trait for typed payloads
///
/// Provides convenient methods for going through `serde` types instead of
/// raw [`DocumentSet`] values.
pub trait StorageExt: Storage {
    /// Serialize `value` and store it
    fn write_from<T: serde::Serialize>(&mut self, value: &T) -> StorageResult<()> {
        let data = serde_json::to_value(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write(&data)
    }

    /// Read the stored document set as `T`
    fn read_as<T: serde::de::DeserializeOwned>(&mut self) -> StorageResult<Option<T>> {
        match self.read()? {
            Some(data) => Ok(Some(serde_json::from_value(data)?)),
            None => Ok(None),
        }
    }
}

// Blanket implementation for all Storage implementors
impl<T: Storage + ?Sized> StorageExt for T {}

/// Builder for creating storage backends from string options
///
/// Used by configuration loaders that only know the backend by name.
pub struct StorageBuilder {
    backend_type: String,
    path: Option<PathBuf>,
    config: HashMap<String, String>,
}

impl StorageBuilder {
    /// Create a new builder
    pub fn new(backend_type: &str) -> Self {
        Self {
            backend_type: backend_type.to_string(),
            path: None,
            config: HashMap::new(),
        }
    }

    /// Add a configuration option
    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the file path (for the JSON backend)
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Build the storage backend
    pub fn build(self) -> StorageResult<Box<dyn Storage>> {
        match self.backend_type.as_str() {
            "json" | "file" => {
                let path = self
                    .path
                    .clone()
                    .ok_or_else(|| StorageError::config("path is required"))?;
                let storage = JsonStorage::with_options(path, self.json_options()?)?;
                Ok(Box::new(storage))
            }
            "memory" => Ok(Box::new(MemoryStorage::new())),
            unknown => Err(StorageError::config(format!(
                "Unknown backend type: {}",
                unknown
            ))),
        }
    }

    fn json_options(&self) -> StorageResult<JsonStorageOptions> {
        let mut options = JsonStorageOptions::default();
        let mut format = JsonFormat::default();

        for (key, value) in &self.config {
            match key.as_str() {
                "create_parent_dirs" => {
                    options.create_parent_dirs = parse_option(key, value)?;
                }
                "access_mode" => options.access_mode = value.parse()?,
                "encoding" => options.encoding = value.parse()?,
                "indent" => format.indent = Some(parse_option(key, value)?),
                "sort_keys" => format.sort_keys = parse_option(key, value)?,
                unknown => {
                    return Err(StorageError::config(format!(
                        "Unknown option for json backend: {}",
                        unknown
                    )))
                }
            }
        }

        options.format = format;
        Ok(options)
    }
}

fn parse_option<T: std::str::FromStr>(key: &str, value: &str) -> StorageResult<T> {
    value
        .parse()
        .map_err(|_| StorageError::config(format!("Invalid value for {}: {:?}", key, value)))
}
