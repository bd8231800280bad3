// # Memory Key-Value Store
//
// In-memory implementation of KeyValueStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for testing, demos, and single-process deployments where losing
// the configuration on restart is acceptable (the fallback table covers
// every key).
//
// ## Crash Behavior
//
// - All settings and mirrors are lost on restart/crash
// - Readers see fallback values until the operator sets them again

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::data::KvData;
use crate::Error;
use crate::config::StoreConfig;
use crate::traits::kv_store::{KeyValueStore, KvStoreFactory};

/// In-memory key-value store implementation
///
/// This implementation stores scalars and lists behind a single RwLock,
/// so every individual call is atomic.
///
/// # Example
///
/// ```rust,no_run
/// use csmn_core::kv::MemoryKvStore;
/// use csmn_core::traits::KeyValueStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryKvStore::new();
///
///     store.set("csmn_title", "Friday stream").await?;
///     assert_eq!(store.get("csmn_title").await?, Some("Friday stream".to_string()));
///
///     store.list_push_tail("csmn_backup_urls", "{}").await?;
///     assert_eq!(store.list_len("csmn_backup_urls").await?, 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryKvStore {
    inner: Arc<RwLock<KvData>>,
}

impl MemoryKvStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(KvData::default())),
        }
    }

    /// Get the number of keys (scalars and lists) in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.key_count()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Clear all keys from the store
    pub async fn clear(&self) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        *guard = KvData::default();
        Ok(())
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.set(key, value);
        Ok(())
    }

    async fn list_range(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.range(key, start, end))
    }

    async fn list_push_tail(&self, key: &str, value: &str) -> Result<usize, Error> {
        let mut guard = self.inner.write().await;
        Ok(guard.push_tail(key, value))
    }

    async fn list_push_head(&self, key: &str, value: &str) -> Result<usize, Error> {
        let mut guard = self.inner.write().await;
        Ok(guard.push_head(key, value))
    }

    async fn list_pop_head(&self, key: &str) -> Result<Option<String>, Error> {
        let mut guard = self.inner.write().await;
        Ok(guard.pop_head(key))
    }

    async fn list_set_at(&self, key: &str, index: usize, value: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.set_at(key, index, value)
    }

    async fn list_len(&self, key: &str) -> Result<usize, Error> {
        let guard = self.inner.read().await;
        Ok(guard.len(key))
    }
}

/// Factory for [`MemoryKvStore`]
#[derive(Debug, Default)]
pub struct MemoryKvStoreFactory;

#[async_trait]
impl KvStoreFactory for MemoryKvStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, Error> {
        match config {
            StoreConfig::Memory => Ok(Arc::new(MemoryKvStore::new())),
            other => Err(Error::config(format!(
                "Memory store factory cannot build a '{}' store",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_scalars() {
        let store = MemoryKvStore::new();

        // Initially empty
        assert!(store.is_empty().await);
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
        assert_eq!(store.len().await, 1);

        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_store_lists() {
        let store = MemoryKvStore::new();

        assert_eq!(store.list_push_tail("l", "b").await.unwrap(), 1);
        assert_eq!(store.list_push_tail("l", "c").await.unwrap(), 2);
        assert_eq!(store.list_push_head("l", "a").await.unwrap(), 3);
        assert_eq!(store.list_range("l", 0, -1).await.unwrap(), vec!["a", "b", "c"]);

        assert_eq!(store.list_pop_head("l").await.unwrap(), Some("a".to_string()));
        store.list_set_at("l", 1, "z").await.unwrap();
        assert_eq!(store.list_range("l", 0, -1).await.unwrap(), vec!["b", "z"]);
        assert_eq!(store.list_len("l").await.unwrap(), 2);

        let err = store.list_set_at("l", 2, "q").await.unwrap_err();
        assert!(matches!(err, Error::OutOfRange { index: 2, .. }));
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = MemoryKvStore::new();
        let other = store.clone();
        store.set("k", "v").await.unwrap();
        assert_eq!(other.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_factory_rejects_other_configs() {
        let factory = MemoryKvStoreFactory;
        assert!(factory.create(&StoreConfig::Memory).await.is_ok());
        let result = factory
            .create(&StoreConfig::File {
                path: "x.json".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}
