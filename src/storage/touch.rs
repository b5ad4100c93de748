//! Ensure a storage file exists before it is opened

use std::fs::{self, OpenOptions};
use std::path::Path;

use super::errors::{StorageError, StorageResult};

/// Create the file at `path` if it does not exist yet.
///
/// With `create_parent_dirs` set, missing ancestor directories are created
/// first. An existing file is opened in append mode and closed again without
/// writing, so neither its content nor its modification time change.
///
/// # Errors
/// Returns [`StorageError::NotFound`] when an ancestor directory is missing
/// and `create_parent_dirs` is false.
pub fn touch<P: AsRef<Path>>(path: P, create_parent_dirs: bool) -> StorageResult<()> {
    let path = path.as_ref();

    if create_parent_dirs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StorageError::open_failed(path, e))?;

    Ok(())
}
