//! In-memory storage backend.

use std::collections::HashMap;

use super::StorageBackend;
use crate::Result;

/// Storage kept in a hash map; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-filled with one entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.into(), value.into());
        storage
    }

    /// Drop the entry under `key`.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("accounts").unwrap(), None);
    }

    #[test]
    fn set_overwrites() {
        let mut storage = MemoryStorage::with_entry("accounts", "[]");
        storage.set("accounts", "[1]").unwrap();
        assert_eq!(storage.get("accounts").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn remove_entry() {
        let mut storage = MemoryStorage::with_entry("accounts", "[]");
        assert_eq!(storage.remove("accounts").as_deref(), Some("[]"));
        assert_eq!(storage.get("accounts").unwrap(), None);
    }
}
