//! Request-level operations over the configuration store
//!
//! [`ConfigService`] is what a transport layer calls. It sequences each
//! mutation with the version bump and turns results into the `{code, msg}`
//! reply envelope that remote callers expect.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::command::{BackupCommand, ConfigCommand};
use crate::error::Result;
use crate::model::{ConfigSnapshot, RemoveOutcome};
use crate::store::ConfigStore;

/// Reply envelope returned for every mutation request
///
/// `code` is `0` on success, `1` for an unknown option, `2` for an unknown
/// `cdn` sub-command and `-1` for any other failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Result code
    pub code: i32,
    /// Human-readable message
    pub msg: String,
}

impl Reply {
    /// Successful reply with the plain `OK` message
    pub fn ok() -> Self {
        Self::new(0, "OK")
    }

    /// Reply with an explicit code and message
    pub fn new(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
        }
    }

    /// Whether the request succeeded
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// What an applied command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The store was changed and the version bumped
    Applied {
        /// Version written after the change
        update_ts: i64,
    },
    /// A removal index was past the end; nothing changed, version untouched
    NothingRemoved {
        /// Requested index
        index: usize,
        /// List length at the time
        len: usize,
    },
}

/// Configuration service
#[derive(Clone)]
pub struct ConfigService {
    store: Arc<ConfigStore>,
}

impl ConfigService {
    /// Create a service over a shared store
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Full read view for players and bots
    pub async fn snapshot(&self) -> Result<ConfigSnapshot> {
        self.store.snapshot().await
    }

    /// Apply a decoded command, then bump the version if anything changed
    pub async fn apply(&self, command: &ConfigCommand) -> Result<CommandOutcome> {
        match command {
            ConfigCommand::SetTitle(title) => self.store.set_title(title).await?,
            ConfigCommand::SetVideoUrl(url) => self.store.set_video_url(url).await?,
            ConfigCommand::SetSubtitleUrl(url) => self.store.set_subtitle_url(url).await?,
            ConfigCommand::SetStartTime(secs) => self.store.set_start_time(*secs).await?,
            ConfigCommand::Backup(BackupCommand::Append { name, url }) => {
                self.store.append_backup(name, url).await?;
            }
            ConfigCommand::Backup(BackupCommand::ReplaceAt { index, name, url }) => {
                self.store.replace_backup(*index, name, url).await?;
            }
            ConfigCommand::Backup(BackupCommand::RemoveAt { index }) => {
                if let RemoveOutcome::OutOfRange { index, len } =
                    self.store.remove_backup(*index).await?
                {
                    return Ok(CommandOutcome::NothingRemoved { index, len });
                }
            }
        }

        let update_ts = self.store.touch().await?;
        Ok(CommandOutcome::Applied { update_ts })
    }

    /// Decode and apply a wire `(key, val)` pair
    ///
    /// Never fails: every error is folded into the reply.
    pub async fn handle(&self, key: &str, val: &str) -> Reply {
        let command = match ConfigCommand::parse(key, val) {
            Ok(command) => command,
            Err(e) => {
                warn!(key, val, "rejected config request: {}", e);
                return match e.reply_code() {
                    -1 => Reply::new(-1, format!("failed to set config: {}", e)),
                    code => Reply::new(code, e.to_string()),
                };
            }
        };

        match self.apply(&command).await {
            Ok(CommandOutcome::Applied { update_ts }) => {
                info!(key, update_ts, "config request applied");
                Reply::ok()
            }
            Ok(CommandOutcome::NothingRemoved { index, len }) => Reply::new(
                0,
                format!(
                    "OK (index {} out of range for {} mirror(s), nothing removed)",
                    index, len
                ),
            ),
            Err(e) => {
                warn!(key, val, "config request failed: {}", e);
                Reply::new(e.reply_code(), format!("failed to set config: {}", e))
            }
        }
    }
}
