//! JSON File Storage Backend
//!
//! Default durable backend: the whole document set lives in one JSON file.
//!
//! The file handle is opened once and kept for the lifetime of the storage.
//! Every `write` rewrites the file from the start, truncates whatever is left
//! of a previous, longer payload and then syncs it to disk. This is not a
//! rename-based atomic write, but a reader never sees old and new content
//! mixed after a successful write.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docstore::storage::{JsonStorage, Storage};
//! use serde_json::json;
//!
//! fn example() -> docstore::storage::StorageResult<()> {
//!     let mut storage = JsonStorage::open("data/db.json")?;
//!
//!     if storage.read()?.is_none() {
//!         storage.write(&json!({"_default": {}}))?;
//!     }
//!
//!     storage.close()
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::access_mode::AccessMode;
use super::encoding::TextEncoding;
use super::errors::{StorageError, StorageResult};
use super::touch::touch;
use super::traits::{DocumentSet, Storage};

/// Output formatting for serialized document sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFormat {
    /// Pretty-print with this many spaces per level; compact when `None`
    #[serde(default)]
    pub indent: Option<usize>,
    /// Sort object keys recursively instead of keeping insertion order
    #[serde(default)]
    pub sort_keys: bool,
}

impl JsonFormat {
    /// Serialize `data` according to this format
    pub fn render(&self, data: &DocumentSet) -> StorageResult<String> {
        let sorted;
        let data = if self.sort_keys {
            sorted = sort_keys(data);
            &sorted
        } else {
            data
        };

        match self.indent {
            None => serde_json::to_string(data)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            Some(width) => {
                let indent = " ".repeat(width);
                let mut buf = Vec::new();
                let mut serializer = serde_json::Serializer::with_formatter(
                    &mut buf,
                    PrettyFormatter::with_indent(indent.as_bytes()),
                );
                data.serialize(&mut serializer)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                String::from_utf8(buf).map_err(|e| StorageError::Serialization(e.to_string()))
            }
        }
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Construction options for [`JsonStorage`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonStorageOptions {
    /// Create missing ancestor directories before opening
    #[serde(default = "default_create_parent_dirs")]
    pub create_parent_dirs: bool,
    /// How the file is opened
    #[serde(default)]
    pub access_mode: AccessMode,
    /// Codec for the file content
    #[serde(default)]
    pub encoding: TextEncoding,
    /// Output formatting
    #[serde(default)]
    pub format: JsonFormat,
}

fn default_create_parent_dirs() -> bool {
    true
}

impl Default for JsonStorageOptions {
    fn default() -> Self {
        Self {
            create_parent_dirs: true,
            access_mode: AccessMode::default(),
            encoding: TextEncoding::default(),
            format: JsonFormat::default(),
        }
    }
}

impl JsonStorageOptions {
    /// Set whether missing parent directories are created
    pub fn with_create_parent_dirs(mut self, create: bool) -> Self {
        self.create_parent_dirs = create;
        self
    }

    /// Set the access mode
    pub fn with_access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    /// Set the text encoding
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Pretty-print with `indent` spaces per level
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.format.indent = Some(indent);
        self
    }

    /// Sort object keys on write
    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.format.sort_keys = sort_keys;
        self
    }
}

/// Non-fatal diagnostics raised while opening a storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageWarning {
    /// The access mode truncates, appends or requires a fresh file, so reads
    /// may not return what was previously stored
    DangerousAccessMode {
        /// The offending mode
        mode: AccessMode,
    },
}

impl fmt::Display for StorageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageWarning::DangerousAccessMode { mode } => write!(
                f,
                "access mode \"{}\" can cause data loss or corruption; use \"r\" or \"r+\"",
                mode
            ),
        }
    }
}

/// Storage backed by a single JSON file
///
/// Owns the open file descriptor until [`close`](Storage::close) is called or
/// the storage is dropped. Opening two storages on the same path at once is
/// not supported; there is no locking between them.
#[derive(Debug)]
pub struct JsonStorage {
    path: PathBuf,
    handle: Option<File>,
    options: JsonStorageOptions,
    warnings: Vec<StorageWarning>,
}

impl JsonStorage {
    /// Open `path` with default options (`r+`, UTF-8, parent dirs created)
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::with_options(path, JsonStorageOptions::default())
    }

    /// Open `path` with the given options.
    ///
    /// The file is created (empty) when missing, except for exclusive-create
    /// modes which need it to be absent.
    ///
    /// # Errors
    /// * [`StorageError::NotFound`] - an ancestor directory is missing and
    ///   `create_parent_dirs` is off
    /// * [`StorageError::Io`] - the file could not be opened in the requested mode
    pub fn with_options<P: AsRef<Path>>(
        path: P,
        options: JsonStorageOptions,
    ) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mode = options.access_mode;

        let mut warnings = Vec::new();
        if mode.is_dangerous() {
            let warning = StorageWarning::DangerousAccessMode { mode };
            warn!(path = %path.display(), "{}", warning);
            warnings.push(warning);
        }

        if !mode.is_exclusive() {
            touch(&path, options.create_parent_dirs)?;
        } else if options.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let handle = mode
            .open_options()
            .open(&path)
            .map_err(|e| StorageError::open_failed(&path, e))?;

        debug!(
            path = %path.display(),
            mode = %mode,
            readable = mode.is_readable(),
            writable = mode.is_writable(),
            encoding = %options.encoding,
            "opened json storage"
        );

        Ok(Self {
            path,
            handle: Some(handle),
            options,
            warnings,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Access mode the file was opened with
    pub fn access_mode(&self) -> AccessMode {
        self.options.access_mode
    }

    /// Text encoding of the file content
    pub fn encoding(&self) -> TextEncoding {
        self.options.encoding
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    /// Diagnostics collected while opening
    pub fn warnings(&self) -> &[StorageWarning] {
        &self.warnings
    }
}

impl Storage for JsonStorage {
    fn backend_type(&self) -> &'static str {
        "json"
    }

    fn read(&mut self) -> StorageResult<Option<DocumentSet>> {
        let file = self.handle.as_mut().ok_or(StorageError::Closed)?;

        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let text = self.options.encoding.decode(&bytes)?;
        if text.trim().is_empty() {
            debug!(path = %self.path.display(), "json storage is empty");
            return Ok(None);
        }

        let data = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "read json storage");
        Ok(Some(data))
    }

    fn write(&mut self, data: &DocumentSet) -> StorageResult<()> {
        let mode = self.options.access_mode;
        let file = self.handle.as_mut().ok_or(StorageError::Closed)?;

        // Encode before touching the file so a bad payload leaves it intact
        let text = self.options.format.render(data)?;
        let bytes = self.options.encoding.encode(&text)?;

        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes)
            .map_err(|source| StorageError::Write { mode, source })?;

        // Drop the tail of a previous, longer payload; must precede the sync
        let end = file.stream_position()?;
        file.set_len(end)?;

        file.flush().map_err(StorageError::Sync)?;
        sync_to_disk(file)?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "wrote json storage");
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.handle.take().is_some() {
            debug!(path = %self.path.display(), "closed json storage");
        }
        Ok(())
    }
}

/// fsync, tolerating descriptors that cannot be synced
fn sync_to_disk(file: &File) -> StorageResult<()> {
    match file.sync_all() {
        Ok(()) => Ok(()),
        Err(e) if matches!(e.kind(), ErrorKind::Unsupported | ErrorKind::InvalidInput) => {
            debug!(error = %e, "fsync not supported, skipping");
            Ok(())
        }
        Err(e) => Err(StorageError::Sync(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    fn temp_file() -> (TempDir, PathBuf) {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("temp_file.json");
        (temp_dir, path)
    }

    #[test]
    fn test_open_creates_file() {
        let (_dir, path) = temp_file();
        let storage = JsonStorage::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(storage.path(), path);
        assert_eq!(storage.access_mode(), AccessMode::ReadWrite);
        assert_eq!(storage.encoding(), TextEncoding::Utf8);
        assert!(storage.warnings().is_empty());
        assert!(!storage.is_closed());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let (dir, _) = temp_file();
        let path = dir.path().join("deep").join("deep_file.json");

        JsonStorage::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_without_parent_dirs_fails() {
        let (dir, _) = temp_file();
        let path = dir.path().join("deep").join("deep_file.json");
        let options = JsonStorageOptions::default().with_create_parent_dirs(false);

        let result = JsonStorage::with_options(&path, options);
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_write_and_read() {
        let (_dir, path) = temp_file();
        let mut storage = JsonStorage::open(&path).unwrap();

        storage.write(&json!({"key": "value"})).unwrap();
        assert_eq!(storage.read().unwrap(), Some(json!({"key": "value"})));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"key\":\"value\"}");
    }

    #[test]
    fn test_empty_object_is_not_no_data() {
        let (_dir, path) = temp_file();
        let mut storage = JsonStorage::open(&path).unwrap();

        assert_eq!(storage.read().unwrap(), None);
        storage.write(&json!({})).unwrap();
        assert_eq!(storage.read().unwrap(), Some(json!({})));
    }

    #[test]
    fn test_read_whitespace_only_is_no_data() {
        let (_dir, path) = temp_file();
        std::fs::write(&path, " \n\t ").unwrap();

        let mut storage = JsonStorage::open(&path).unwrap();
        assert_eq!(storage.read().unwrap(), None);
    }

    #[test]
    fn test_read_invalid_json() {
        let (_dir, path) = temp_file();
        std::fs::write(&path, "invalid json").unwrap();

        let mut storage = JsonStorage::open(&path).unwrap();
        let err = storage.read().unwrap_err();
        assert!(matches!(err, StorageError::Decode(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_shorter_write_truncates() {
        let (_dir, path) = temp_file();
        let mut storage = JsonStorage::open(&path).unwrap();

        storage.write(&json!({"key": "z".repeat(100)})).unwrap();
        storage.write(&json!({"key": "shorter data"})).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains('z'));
        assert_eq!(content.len(), "{\"key\":\"shorter data\"}".len());
        assert_eq!(
            serde_json::from_str::<Value>(&content).unwrap(),
            json!({"key": "shorter data"})
        );
    }

    #[test]
    fn test_write_read_only_mode() {
        let (_dir, path) = temp_file();
        std::fs::write(&path, "{\"key\":\"original\"}").unwrap();
        let options = JsonStorageOptions::default().with_access_mode(AccessMode::Read);
        let mut storage = JsonStorage::with_options(&path, options).unwrap();

        let err = storage.write(&json!({"key": "value"})).unwrap_err();
        assert!(matches!(err, StorageError::Write { mode: AccessMode::Read, .. }));
        assert!(err.is_io());
        assert!(!err.is_decode());

        assert_eq!(storage.read().unwrap(), Some(json!({"key": "original"})));
    }

    #[test]
    fn test_mode_capabilities_match_handle() {
        let (_dir, path) = temp_file();
        std::fs::write(&path, "{\"key\":\"old\"}").unwrap();

        for mode in [AccessMode::Read, AccessMode::ReadWrite, AccessMode::Append] {
            let options = JsonStorageOptions::default().with_access_mode(mode);
            let mut storage = JsonStorage::with_options(&path, options).unwrap();

            assert_eq!(storage.read().is_ok(), mode.is_readable(), "{}", mode);
            if mode.is_writable() {
                storage.write(&json!({"key": "old"})).unwrap();
            } else {
                assert!(storage.write(&json!({"key": "new"})).is_err(), "{}", mode);
            }
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_sync_skips_unsyncable_descriptor() {
        // Character devices without an fsync hook report EINVAL
        let file = std::fs::OpenOptions::new()
            .write(true)
            .open("/dev/null")
            .unwrap();
        assert!(sync_to_disk(&file).is_ok());
    }

    #[test]
    fn test_sync_succeeds_on_regular_file() {
        let (_dir, path) = temp_file();
        let file = std::fs::File::create(&path).unwrap();
        assert!(sync_to_disk(&file).is_ok());
    }

    #[test]
    fn test_operations_after_close() {
        let (_dir, path) = temp_file();
        let mut storage = JsonStorage::open(&path).unwrap();
        storage.close().unwrap();

        assert!(storage.is_closed());
        assert!(matches!(
            storage.write(&json!({"key": "value"})),
            Err(StorageError::Closed)
        ));
        assert!(matches!(storage.read(), Err(StorageError::Closed)));

        // A second close is harmless
        storage.close().unwrap();
    }

    #[test]
    fn test_close_without_write() {
        let (_dir, path) = temp_file();
        let mut storage = JsonStorage::open(&path).unwrap();
        storage.close().unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_dangerous_mode_warns() {
        let (_dir, path) = temp_file();
        let options = JsonStorageOptions::default().with_access_mode(AccessMode::WriteRead);
        let mut storage = JsonStorage::with_options(&path, options).unwrap();

        assert_eq!(
            storage.warnings(),
            &[StorageWarning::DangerousAccessMode {
                mode: AccessMode::WriteRead
            }]
        );
        storage.write(&json!({"key": "value"})).unwrap();
        assert_eq!(storage.read().unwrap(), Some(json!({"key": "value"})));
    }

    #[test]
    fn test_write_mode_truncates_existing_content() {
        let (_dir, path) = temp_file();
        std::fs::write(&path, "{\"key\":\"old\"}").unwrap();
        let options = JsonStorageOptions::default().with_access_mode(AccessMode::Write);
        let mut storage = JsonStorage::with_options(&path, options).unwrap();

        assert_eq!(storage.warnings().len(), 1);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        // Write-only handles cannot be read back
        assert!(storage.read().unwrap_err().is_io());
    }

    #[test]
    fn test_exclusive_mode_requires_fresh_file() {
        let (dir, path) = temp_file();
        let options = JsonStorageOptions::default().with_access_mode(AccessMode::ExclusiveRead);

        let fresh = dir.path().join("sub").join("fresh.json");
        let mut storage = JsonStorage::with_options(&fresh, options.clone()).unwrap();
        storage.write(&json!([1, 2, 3])).unwrap();
        assert_eq!(storage.read().unwrap(), Some(json!([1, 2, 3])));

        std::fs::write(&path, "").unwrap();
        let result = JsonStorage::with_options(&path, options);
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn test_encoding_roundtrip() {
        let (_dir, path) = temp_file();
        let options = JsonStorageOptions::default().with_encoding(TextEncoding::Utf16Le);
        let mut storage = JsonStorage::with_options(&path, options).unwrap();

        storage.write(&json!({"name": "Zoë"})).unwrap();
        assert_eq!(storage.read().unwrap(), Some(json!({"name": "Zoë"})));
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            2 * "{\"name\":\"Zoë\"}".chars().count() as u64
        );
    }

    #[test]
    fn test_read_undecodable_bytes() {
        let (_dir, path) = temp_file();
        std::fs::write(&path, b"{\"key\": \"caf\xe9\"}").unwrap();

        let mut storage = JsonStorage::open(&path).unwrap();
        let err = storage.read().unwrap_err();
        assert!(matches!(err, StorageError::Encoding { .. }));
        assert!(err.is_decode());

        let options = JsonStorageOptions::default().with_encoding(TextEncoding::Latin1);
        let mut storage = JsonStorage::with_options(&path, options).unwrap();
        assert_eq!(storage.read().unwrap(), Some(json!({"key": "café"})));
    }

    #[test]
    fn test_unencodable_payload_leaves_file_intact() {
        let (_dir, path) = temp_file();
        let options = JsonStorageOptions::default().with_encoding(TextEncoding::Ascii);
        let mut storage = JsonStorage::with_options(&path, options).unwrap();

        storage.write(&json!({"key": "plain"})).unwrap();
        let err = storage.write(&json!({"key": "snow ☃"})).unwrap_err();
        assert!(err.is_decode());
        assert_eq!(storage.read().unwrap(), Some(json!({"key": "plain"})));
    }

    #[test]
    fn test_format_indent_and_sort_keys() {
        let (_dir, path) = temp_file();
        let options = JsonStorageOptions::default()
            .with_indent(4)
            .with_sort_keys(true);
        let mut storage = JsonStorage::with_options(&path, options).unwrap();

        let data = json!({"zeta": {"b": 1, "a": [{"y": 0, "x": 1}]}, "alpha": null});
        storage.write(&data).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n    \"alpha\": null,\n    \"zeta\""));
        assert!(content.find("\"x\"").unwrap() < content.find("\"y\"").unwrap());
        assert_eq!(storage.read().unwrap(), Some(data));
    }

    #[test]
    fn test_insertion_order_preserved_without_sort() {
        let format = JsonFormat::default();
        let text = format.render(&json!({"b": 1, "a": 2})).unwrap();
        assert_eq!(text, "{\"b\":1,\"a\":2}");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: JsonStorageOptions = serde_json::from_value(json!({
            "access_mode": "rb+",
            "format": {"indent": 2}
        }))
        .unwrap();

        assert!(options.create_parent_dirs);
        assert_eq!(options.access_mode, AccessMode::ReadWrite);
        assert_eq!(options.encoding, TextEncoding::Utf8);
        assert_eq!(options.format.indent, Some(2));
        assert!(!options.format.sort_keys);
    }
}
