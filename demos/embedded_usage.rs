//! Minimal embedding example for csmn-core
//!
//! Runs the configuration store in-process over a custom KeyValueStore that
//! counts round trips, to show what a mirror removal costs.

use csmn_core::{
    BackupCommand, ConfigCommand, ConfigService, ConfigStore, FallbackTable, KeyValueStore,
    MemoryKvStore, Result,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store wrapper that counts every call
struct CountingStore {
    inner: MemoryKvStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryKvStore::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn take_calls(&self) -> usize {
        self.calls.swap(0, Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.tick();
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.tick();
        self.inner.set(key, value).await
    }

    async fn list_range(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>> {
        self.tick();
        self.inner.list_range(key, start, end).await
    }

    async fn list_push_tail(&self, key: &str, value: &str) -> Result<usize> {
        self.tick();
        self.inner.list_push_tail(key, value).await
    }

    async fn list_push_head(&self, key: &str, value: &str) -> Result<usize> {
        self.tick();
        self.inner.list_push_head(key, value).await
    }

    async fn list_pop_head(&self, key: &str) -> Result<Option<String>> {
        self.tick();
        self.inner.list_pop_head(key).await
    }

    async fn list_set_at(&self, key: &str, index: usize, value: &str) -> Result<()> {
        self.tick();
        self.inner.list_set_at(key, index, value).await
    }

    async fn list_len(&self, key: &str) -> Result<usize> {
        self.tick();
        self.inner.list_len(key).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let kv = Arc::new(CountingStore::new());
    let store = ConfigStore::new(kv.clone(), FallbackTable::default());
    let service = ConfigService::new(Arc::new(store));

    let snapshot = service.snapshot().await?;
    println!("empty store serves: {:?}", snapshot.quality);

    for i in 0..5 {
        let command = ConfigCommand::Backup(BackupCommand::Append {
            name: format!("Mirror{}", i),
            url: format!("https://m{}.example", i),
        });
        service.apply(&command).await?;
    }
    kv.take_calls();

    let outcome = service
        .apply(&ConfigCommand::Backup(BackupCommand::RemoveAt { index: 3 }))
        .await?;
    println!(
        "remove_at(3): {:?} in {} store calls (including the version bump)",
        outcome,
        kv.take_calls()
    );

    for mirror in service.store().list_backups().await? {
        println!(
            "  {}{} {}",
            if mirror.default { "* " } else { "  " },
            mirror.name,
            mirror.url
        );
    }

    Ok(())
}
