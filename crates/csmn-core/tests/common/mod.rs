//! Test doubles and common utilities for contract tests
//!
//! The doubles wrap [`MemoryKvStore`] so list semantics stay real while
//! calls are counted or failures injected.

#![allow(dead_code)]

use csmn_core::error::Result;
use csmn_core::{ConfigStore, Error, FallbackTable, KeyValueStore, MemoryKvStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A store that counts list pops, pushes and overwrites, and can fail the Nth pop
pub struct FlakyKvStore {
    inner: MemoryKvStore,
    pops: AtomicUsize,
    head_pushes: AtomicUsize,
    set_ats: AtomicUsize,
    /// 1-based pop call that fails, if any
    fail_pop_at: Option<usize>,
}

impl FlakyKvStore {
    pub fn new(inner: MemoryKvStore) -> Self {
        Self {
            inner,
            pops: AtomicUsize::new(0),
            head_pushes: AtomicUsize::new(0),
            set_ats: AtomicUsize::new(0),
            fail_pop_at: None,
        }
    }

    /// Fail the `n`th call to `list_pop_head` (1-based)
    pub fn failing_pop_at(inner: MemoryKvStore, n: usize) -> Self {
        Self {
            fail_pop_at: Some(n),
            ..Self::new(inner)
        }
    }

    pub fn pop_count(&self) -> usize {
        self.pops.load(Ordering::SeqCst)
    }

    pub fn head_push_count(&self) -> usize {
        self.head_pushes.load(Ordering::SeqCst)
    }

    pub fn set_at_count(&self) -> usize {
        self.set_ats.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FlakyKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn list_range(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>> {
        self.inner.list_range(key, start, end).await
    }

    async fn list_push_tail(&self, key: &str, value: &str) -> Result<usize> {
        self.inner.list_push_tail(key, value).await
    }

    async fn list_push_head(&self, key: &str, value: &str) -> Result<usize> {
        self.head_pushes.fetch_add(1, Ordering::SeqCst);
        self.inner.list_push_head(key, value).await
    }

    async fn list_pop_head(&self, key: &str) -> Result<Option<String>> {
        let call = self.pops.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_pop_at == Some(call) {
            return Err(Error::store_unavailable("injected pop failure"));
        }
        self.inner.list_pop_head(key).await
    }

    async fn list_set_at(&self, key: &str, index: usize, value: &str) -> Result<()> {
        self.set_ats.fetch_add(1, Ordering::SeqCst);
        self.inner.list_set_at(key, index, value).await
    }

    async fn list_len(&self, key: &str) -> Result<usize> {
        self.inner.list_len(key).await
    }
}

/// A store whose every call fails as unreachable
pub struct UnreachableKvStore;

#[async_trait::async_trait]
impl KeyValueStore for UnreachableKvStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::store_unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::store_unavailable("connection refused"))
    }

    async fn list_range(&self, _key: &str, _start: isize, _end: isize) -> Result<Vec<String>> {
        Err(Error::store_unavailable("connection refused"))
    }

    async fn list_push_tail(&self, _key: &str, _value: &str) -> Result<usize> {
        Err(Error::store_unavailable("connection refused"))
    }

    async fn list_push_head(&self, _key: &str, _value: &str) -> Result<usize> {
        Err(Error::store_unavailable("connection refused"))
    }

    async fn list_pop_head(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::store_unavailable("connection refused"))
    }

    async fn list_set_at(&self, _key: &str, _index: usize, _value: &str) -> Result<()> {
        Err(Error::store_unavailable("connection refused"))
    }

    async fn list_len(&self, _key: &str) -> Result<usize> {
        Err(Error::store_unavailable("connection refused"))
    }
}

/// A config store over a fresh memory store, plus a handle to that store
pub fn memory_config_store() -> (ConfigStore, MemoryKvStore) {
    let kv = MemoryKvStore::new();
    let store = ConfigStore::new(Arc::new(kv.clone()), FallbackTable::default());
    (store, kv)
}

/// Append one mirror per name, with URL `https://<name>`
pub async fn seed_backups(store: &ConfigStore, names: &[&str]) {
    for name in names {
        store
            .append_backup(name, &format!("https://{name}"))
            .await
            .expect("append succeeds");
    }
}

/// Stored mirror names in list order
pub async fn backup_names(store: &ConfigStore) -> Vec<String> {
    store
        .stored_backups()
        .await
        .expect("list succeeds")
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}
