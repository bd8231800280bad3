// # Key-Value Store Trait
//
// Defines the capability set the configuration store is written against.
//
// ## Purpose
//
// The store is the sole source of truth for every setting, the backup
// mirror list, and the change timestamp. The core never caches values
// across calls; every read goes back to the store.
//
// ## Capabilities
//
// - Scalars: `get`, `set`
// - Lists: range read, push to tail, push to head, pop from head,
//   overwrite by index, length
//
// There is deliberately no positional delete. Removal by index is built on
// top of pop/push in `store::backups`.
//
// ## Implementations
//
// - `MemoryKvStore`: in-process, not persistent
// - `FileKvStore`: JSON file with atomic writes
// - `RedisKvStore` (csmn-store-redis): Redis strings and lists

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::StoreConfig;

/// Trait for key-value store implementations
///
/// List semantics follow Redis: `list_range` takes an inclusive `end`,
/// and negative indices count from the tail (`-1` is the last element).
/// A missing list behaves like an empty one.
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
/// Each call is expected to be atomic on its own key; nothing spanning
/// several calls is.
///
/// # Errors
///
/// Transport failures surface as [`Error::StoreUnavailable`](crate::Error::StoreUnavailable).
/// `list_set_at` past the end surfaces as [`Error::OutOfRange`](crate::Error::OutOfRange).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a scalar value
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: The stored value
    /// - `Ok(None)`: Key absent
    /// - `Err(Error)`: Storage error
    async fn get(&self, key: &str) -> Result<Option<String>, crate::Error>;

    /// Write a scalar value, overwriting any previous one
    async fn set(&self, key: &str, value: &str) -> Result<(), crate::Error>;

    /// Read elements `start..=end` of a list
    ///
    /// Out-of-range bounds are clamped; an inverted range yields an empty vector.
    async fn list_range(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> Result<Vec<String>, crate::Error>;

    /// Append to the tail of a list, creating it if needed
    ///
    /// # Returns
    ///
    /// The list length after the push
    async fn list_push_tail(&self, key: &str, value: &str) -> Result<usize, crate::Error>;

    /// Prepend to the head of a list, creating it if needed
    ///
    /// # Returns
    ///
    /// The list length after the push
    async fn list_push_head(&self, key: &str, value: &str) -> Result<usize, crate::Error>;

    /// Remove and return the head of a list
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: The former head
    /// - `Ok(None)`: List empty or absent
    async fn list_pop_head(&self, key: &str) -> Result<Option<String>, crate::Error>;

    /// Overwrite the element at `index`
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`](crate::Error::OutOfRange) when `index >= len`,
    /// including when the list does not exist.
    async fn list_set_at(&self, key: &str, index: usize, value: &str)
    -> Result<(), crate::Error>;

    /// Number of elements in a list (0 when absent)
    async fn list_len(&self, key: &str) -> Result<usize, crate::Error>;
}

/// Helper trait for constructing stores from configuration
#[async_trait]
pub trait KvStoreFactory: Send + Sync {
    /// Create a store instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Store configuration (the variant this factory was registered for)
    ///
    /// # Returns
    ///
    /// A shared store handle
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, crate::Error>;
}
