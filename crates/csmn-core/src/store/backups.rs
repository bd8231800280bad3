// # Backup Mirror List
//
// Ordered CRUD over the mirror list stored under `csmn_backup_urls`.
//
// The store only offers append, push-to-head, pop-from-head and
// overwrite-by-index. Removal by index is done by rotating the head:
//
// 1. Pop `index` elements into a buffer (the prefix before the target)
// 2. Pop the target and discard it
// 3. Push the buffer back onto the head, last-popped first
//
// If the list runs out before the target is reached, the buffer is pushed
// back the same way and nothing is removed. The prefix is restored on every
// exit path, including store errors part-way through.
//
// The rotation costs O(index) round trips and is not atomic against other
// processes writing the same list.

use tracing::{debug, error, info, warn};

use super::ConfigStore;
use crate::error::{Error, Result};
use crate::model::{BACKUP_LIST_KEY, BackupEntry, BackupView, RemoveOutcome};

impl ConfigStore {
    /// Mirrors as rendered to callers
    ///
    /// An empty list yields the fallback sample entry. The entry at
    /// position 0 is marked `default`; no other entry is.
    pub async fn list_backups(&self) -> Result<Vec<BackupView>> {
        let mut entries = self.stored_backups().await?;
        if entries.is_empty() {
            entries.push(self.fallback.sample_backup().clone());
        }

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| BackupView {
                name: entry.name,
                url: entry.url,
                default: index == 0,
            })
            .collect())
    }

    /// Mirrors exactly as stored, without fallback substitution
    ///
    /// A record that fails to decode fails the whole read so displayed
    /// positions always match physical positions.
    pub async fn stored_backups(&self) -> Result<Vec<BackupEntry>> {
        let raw = {
            let _guard = self.list_lock.lock().await;
            self.kv.list_range(BACKUP_LIST_KEY, 0, -1).await?
        };
        debug!(count = raw.len(), "read backup list");

        raw.iter()
            .enumerate()
            .map(|(index, record)| decode_entry(index, record))
            .collect()
    }

    /// Append a mirror at the tail
    ///
    /// # Returns
    ///
    /// The list length after the append
    pub async fn append_backup(&self, name: &str, url: &str) -> Result<usize> {
        let record = encode_entry(&BackupEntry::new(name, url))?;

        let _guard = self.list_lock.lock().await;
        let len = self.kv.list_push_tail(BACKUP_LIST_KEY, &record).await?;
        info!(name, url, len, "backup mirror appended");
        Ok(len)
    }

    /// Overwrite the mirror physically stored at `index`
    ///
    /// Bounds are checked against the list length before writing, so every
    /// backend reports a bad index the same way.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index` is past the end; the list is unchanged.
    pub async fn replace_backup(&self, index: usize, name: &str, url: &str) -> Result<()> {
        let record = encode_entry(&BackupEntry::new(name, url))?;

        let _guard = self.list_lock.lock().await;
        let len = self.kv.list_len(BACKUP_LIST_KEY).await?;
        if index >= len {
            warn!(index, len, "backup index out of range, nothing replaced");
            return Err(Error::out_of_range(BACKUP_LIST_KEY, index));
        }
        self.kv.list_set_at(BACKUP_LIST_KEY, index, &record).await?;
        info!(index, name, url, "backup mirror replaced");
        Ok(())
    }

    /// Remove the mirror at `index`, preserving the order of the rest
    ///
    /// An index past the end is not an error: the list is left as it was
    /// and [`RemoveOutcome::OutOfRange`] reports what happened.
    pub async fn remove_backup(&self, index: usize) -> Result<RemoveOutcome> {
        let _guard = self.list_lock.lock().await;

        let mut prefix: Vec<String> = Vec::with_capacity(index);
        let popped = self.pop_through(index, &mut prefix).await;
        let restored = self.restore_prefix(&prefix).await;

        let target = match (popped, restored) {
            (Ok(target), Ok(())) => target,
            (Err(e), Ok(())) => return Err(e),
            (Ok(_), Err(e)) | (Err(_), Err(e)) => {
                error!(
                    index,
                    buffered = prefix.len(),
                    "failed to restore backup list prefix: {}",
                    e
                );
                return Err(e);
            }
        };

        match target {
            Some(record) => {
                let entry = match decode_entry(index, &record) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(index, "removed an undecodable backup record: {}", e);
                        None
                    }
                };
                info!(index, "backup mirror removed");
                Ok(RemoveOutcome::Removed { index, entry })
            }
            None => {
                let len = prefix.len();
                warn!(index, len, "backup index out of range, nothing removed");
                Ok(RemoveOutcome::OutOfRange { index, len })
            }
        }
    }

    /// Pop the `index` elements before the target into `prefix`, then pop
    /// the target itself. `None` means the list ended first.
    async fn pop_through(&self, index: usize, prefix: &mut Vec<String>) -> Result<Option<String>> {
        while prefix.len() < index {
            match self.kv.list_pop_head(BACKUP_LIST_KEY).await? {
                Some(record) => prefix.push(record),
                None => return Ok(None),
            }
        }
        self.kv.list_pop_head(BACKUP_LIST_KEY).await
    }

    /// Push the buffered prefix back, last-popped first
    async fn restore_prefix(&self, prefix: &[String]) -> Result<()> {
        for record in prefix.iter().rev() {
            self.kv.list_push_head(BACKUP_LIST_KEY, record).await?;
        }
        Ok(())
    }
}

fn encode_entry(entry: &BackupEntry) -> Result<String> {
    Ok(serde_json::to_string(entry)?)
}

fn decode_entry(index: usize, record: &str) -> Result<BackupEntry> {
    serde_json::from_str(record).map_err(|e| Error::malformed(index, e.to_string()))
}
