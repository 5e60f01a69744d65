// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Durable string/boolean preference storage.
///
/// A write is considered durable once the returned future completes.
/// Reading a key with the wrong accessor (e.g. `get_bool` on a string)
/// is an error, not an absent value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    async fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Removes the key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    Text(String),
    Flag(bool),
}

/// Non-durable store kept in a map. Used by tests and as a stand-in
/// when no database is wanted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.values.read().get(key) {
            None => Ok(None),
            Some(StoredValue::Text(value)) => Ok(Some(value.clone())),
            Some(StoredValue::Flag(_)) => bail!("Key '{}' holds a bool, not a string", key),
        }
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .insert(key.to_string(), StoredValue::Text(value.to_string()));
        Ok(())
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.values.read().get(key) {
            None => Ok(None),
            Some(StoredValue::Flag(value)) => Ok(Some(*value)),
            Some(StoredValue::Text(_)) => bail!("Key '{}' holds a string, not a bool", key),
        }
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.values
            .write()
            .insert(key.to_string(), StoredValue::Flag(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_keys_read_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get_string("tasks").await.unwrap(), None);
        assert_eq!(store.get_bool("reminders_enabled").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_and_remove_clears() {
        let store = MemoryStore::new();
        store.set_string("tasks", "[]").await.unwrap();
        store.set_string("tasks", "[1]").await.unwrap();
        assert_eq!(store.get_string("tasks").await.unwrap().as_deref(), Some("[1]"));

        store.remove("tasks").await.unwrap();
        store.remove("tasks").await.unwrap();
        assert_eq!(store.get_string("tasks").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reading_with_wrong_type_fails() {
        let store = MemoryStore::new();
        store.set_bool("reminders_enabled", false).await.unwrap();
        assert!(store.get_string("reminders_enabled").await.is_err());
        assert_eq!(store.get_bool("reminders_enabled").await.unwrap(), Some(false));
    }
}
