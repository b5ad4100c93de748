//! In-memory storage backend
//!
//! Keeps the last written document set in process memory. Nothing is
//! persisted; useful for tests and throwaway databases.

use super::traits::{DocumentSet, Storage};
use super::errors::StorageResult;

/// Volatile storage holding a single document set
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    memory: Option<DocumentSet>,
}

impl MemoryStorage {
    /// Create an empty memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    fn read(&mut self) -> StorageResult<Option<DocumentSet>> {
        Ok(self.memory.clone())
    }

    fn write(&mut self, data: &DocumentSet) -> StorageResult<()> {
        self.memory = Some(data.clone());
        Ok(())
    }
}
