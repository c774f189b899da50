use std::collections::HashMap;
use std::sync::RwLock;

use super::backend::{StorageBackend, StorageError};

/// In-memory backend for tests and ephemeral stores.
///
/// Share one instance between a primed record and a store under test by
/// wrapping it in an `Arc` and handing clones to both sides.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Whether the backend holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.records.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.records
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("missing").unwrap(), None);

        storage.set("key", "value").unwrap();
        assert_eq!(storage.get("key").unwrap().as_deref(), Some("value"));

        storage.set("key", "replaced").unwrap();
        assert_eq!(storage.get("key").unwrap().as_deref(), Some("replaced"));
        assert_eq!(storage.len(), 1);
    }
}
