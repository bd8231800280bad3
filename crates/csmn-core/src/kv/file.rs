// # File Key-Value Store
//
// File-based implementation of KeyValueStore with crash recovery.
//
// ## Purpose
//
// Keeps settings and the mirror list across daemon restarts without an
// external server. Every mutating call is written through before it returns.
//
// ## Crash Recovery
//
// - Atomic writes: new content goes to `<file>.tmp`, then renamed over the file
// - Backup: the previous file is copied to `<file>.backup` before each rename
// - Recovery: if the main file fails to parse, the backup is loaded and restored
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "scalars": { "csmn_title": "Friday stream" },
//   "lists": { "csmn_backup_urls": ["{\"name\":\"m1\",\"url\":\"https://m1\"}"] }
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::data::KvData;
use crate::Error;
use crate::config::StoreConfig;
use crate::traits::kv_store::{KeyValueStore, KvStoreFactory};

/// Store file format version
const STORE_FILE_VERSION: &str = "1.0";

/// Serializable store file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StoreFileFormat {
    version: String,
    #[serde(flatten)]
    data: KvData,
}

/// File-backed key-value store with crash recovery
///
/// # Example
///
/// ```rust,no_run
/// use csmn_core::kv::FileKvStore;
/// use csmn_core::traits::KeyValueStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileKvStore::new("/var/lib/csmn/store.json").await?;
///
///     // Written to disk before the call returns
///     store.set("csmn_title", "Friday stream").await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    data: Arc<RwLock<KvData>>,
}

impl FileKvStore {
    /// Create or load a file store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing file, if any
    /// 3. Fall back to the backup if the file is corrupted
    /// 4. Start empty if neither can be read
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let data = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
        })
    }

    async fn load_with_recovery(path: &Path) -> Result<KvData, Error> {
        match Self::load(path).await {
            Ok(data) => {
                tracing::debug!("Loaded store file: {} keys", data.key_count());
                Ok(data)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Store file {} appears corrupted: {}. Attempting recovery from backup.",
                    path.display(),
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty store.");
                    return Ok(KvData::default());
                }

                match Self::load(&backup_path).await {
                    Ok(data) => {
                        tracing::info!("Recovered store from backup: {} keys", data.key_count());
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore store file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(data)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also unreadable: {}. Starting with empty store.",
                            backup_err
                        );
                        Ok(KvData::default())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn load(path: &Path) -> Result<KvData, Error> {
        if !path.exists() {
            tracing::debug!("Store file does not exist: {}", path.display());
            return Ok(KvData::default());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store_unavailable(format!(
                "Failed to read store file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: StoreFileFormat = serde_json::from_str(&content)?;

        if file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Store file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.data)
    }

    /// Write `data` to the file atomically
    async fn write_file(&self, data: &KvData) -> Result<(), Error> {
        let file = StoreFileFormat {
            version: STORE_FILE_VERSION.to_string(),
            data: data.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = self.temp_path();
        {
            let mut temp = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store_unavailable(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store_unavailable(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.flush().await.map_err(|e| {
                Error::store_unavailable(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store_unavailable(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Store written to file: {}", self.path.display());
        Ok(())
    }

    /// Apply `op` to a copy of the data and commit it only once it is on disk.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut KvData) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let out = op(&mut next)?;
        if next != *guard {
            self.write_file(&next).await?;
            *guard = next;
        }
        Ok(out)
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.data.read().await.get(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.mutate(|data| {
            data.set(key, value);
            Ok(())
        })
        .await
    }

    async fn list_range(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>, Error> {
        Ok(self.data.read().await.range(key, start, end))
    }

    async fn list_push_tail(&self, key: &str, value: &str) -> Result<usize, Error> {
        self.mutate(|data| Ok(data.push_tail(key, value))).await
    }

    async fn list_push_head(&self, key: &str, value: &str) -> Result<usize, Error> {
        self.mutate(|data| Ok(data.push_head(key, value))).await
    }

    async fn list_pop_head(&self, key: &str) -> Result<Option<String>, Error> {
        self.mutate(|data| Ok(data.pop_head(key))).await
    }

    async fn list_set_at(&self, key: &str, index: usize, value: &str) -> Result<(), Error> {
        self.mutate(|data| data.set_at(key, index, value)).await
    }

    async fn list_len(&self, key: &str) -> Result<usize, Error> {
        Ok(self.data.read().await.len(key))
    }
}

/// Factory for [`FileKvStore`]
#[derive(Debug, Default)]
pub struct FileKvStoreFactory;

#[async_trait]
impl KvStoreFactory for FileKvStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, Error> {
        match config {
            StoreConfig::File { path } => Ok(Arc::new(FileKvStore::new(path).await?)),
            other => Err(Error::config(format!(
                "File store factory cannot build a '{}' store",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileKvStore::new(&path).await.unwrap();
        store.set("csmn_title", "hello").await.unwrap();
        store.list_push_tail("l", "a").await.unwrap();
        store.list_push_tail("l", "b").await.unwrap();
        assert!(path.exists());

        let reopened = FileKvStore::new(&path).await.unwrap();
        assert_eq!(
            reopened.get("csmn_title").await.unwrap(),
            Some("hello".to_string())
        );
        assert_eq!(reopened.list_range("l", 0, -1).await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileKvStore::new(&path).await.unwrap();
        store.set("k", "v").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileKvStore::new(&path).await.unwrap();
        store.set("k", "first").await.unwrap();
        // Second write copies the first file to the backup
        store.set("k", "second").await.unwrap();
        assert!(FileKvStore::backup_path(&path).exists());

        fs::write(&path, b"corrupted json data").await.unwrap();

        let recovered = FileKvStore::new(&path).await.unwrap();
        assert_eq!(recovered.get("k").await.unwrap(), Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_failed_mutation_is_not_committed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileKvStore::new(&path).await.unwrap();
        store.list_push_tail("l", "a").await.unwrap();
        assert!(store.list_set_at("l", 4, "z").await.is_err());
        assert_eq!(store.list_range("l", 0, -1).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_rotation_sequence_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileKvStore::new(&path).await.unwrap();
        for v in ["a", "b", "c"] {
            store.list_push_tail("l", v).await.unwrap();
        }
        let head = store.list_pop_head("l").await.unwrap().unwrap();
        store.list_pop_head("l").await.unwrap();
        store.list_push_head("l", &head).await.unwrap();

        let reopened = FileKvStore::new(&path).await.unwrap();
        assert_eq!(reopened.list_range("l", 0, -1).await.unwrap(), vec!["a", "c"]);
    }
}
