//! Error types for storage backends

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::access_mode::AccessMode;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Error types for storage operations
///
/// The variants fall into three categories that callers usually want to tell
/// apart: decode errors (bad content), I/O errors (bad media or permissions)
/// and usage errors (closed handle, bad configuration).
#[derive(Debug, Error)]
pub enum StorageError {
    /// An ancestor directory of the target path does not exist
    #[error("Path not found: {}", path.display())]
    NotFound {
        /// The path that could not be created or opened
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Stored content is not valid JSON
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Stored bytes are not valid under the configured text encoding,
    /// or text cannot be represented in it
    #[error("Encoding error ({encoding}): {message}")]
    Encoding {
        /// Name of the configured encoding
        encoding: String,
        /// What went wrong
        message: String,
    },

    /// A typed payload could not be serialized to JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The write call itself failed
    #[error("Cannot write to the database (access mode \"{mode}\"): {source}")]
    Write {
        /// Access mode the handle was opened with
        mode: AccessMode,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Flushing or syncing written data failed
    #[error("Sync error: {0}")]
    Sync(#[source] std::io::Error),

    /// Any other IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage was used after `close()`
    #[error("Storage is closed")]
    Closed,

    /// Invalid backend configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an encoding error
    pub fn encoding<E: ToString, S: Into<String>>(encoding: E, message: S) -> Self {
        Self::Encoding {
            encoding: encoding.to_string(),
            message: message.into(),
        }
    }

    /// Classify a failure to open or create `path`
    pub(crate) fn open_failed(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
                source,
            },
            _ => Self::Io(source),
        }
    }

    /// True when the stored content (not the medium) is at fault
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            StorageError::Decode(_) | StorageError::Encoding { .. } | StorageError::Serialization(_)
        )
    }

    /// True for failures of the underlying file or filesystem
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound { .. }
                | StorageError::Write { .. }
                | StorageError::Sync(_)
                | StorageError::Io(_)
        )
    }

    /// Check if this error is recoverable (user can potentially fix it)
    ///
    /// Corrupt content and closed handles are not: retrying the same call
    /// gives the same result.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound { .. }
                | StorageError::Write { .. }
                | StorageError::Configuration(_)
        )
    }
}
