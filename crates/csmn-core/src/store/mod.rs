//! Versioned configuration store
//!
//! [`ConfigStore`] wraps a [`KeyValueStore`] and a [`FallbackTable`]:
//!
//! - typed get/set for every [`Setting`]
//! - ordered CRUD over the backup mirror list (see [`backups`])
//! - the change timestamp used by readers for cache invalidation
//!
//! ## Consistency
//!
//! Nothing here is transactional. A setting write and the following
//! [`ConfigStore::touch`] are two store calls, so a reader can see the new
//! value with the old timestamp. The timestamp is advisory only.
//!
//! The store keeps no values between calls. The only in-process state is the
//! fallback table and a mutex that serializes list mutations issued through
//! this instance; writers in other processes are not covered by it.

pub mod backups;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fallback::FallbackTable;
use crate::model::{ConfigSnapshot, Setting, SettingValue, SubtitleView, VERSION_KEY};
use crate::traits::KeyValueStore;

/// Typed access to settings, mirrors and the change timestamp
pub struct ConfigStore {
    /// Backing store, the sole source of truth
    kv: Arc<dyn KeyValueStore>,

    /// Values served for absent keys
    fallback: FallbackTable,

    /// Serializes list mutations issued through this instance
    list_lock: Mutex<()>,
}

impl ConfigStore {
    /// Create a store over an injected key-value handle
    pub fn new(kv: Arc<dyn KeyValueStore>, fallback: FallbackTable) -> Self {
        Self {
            kv,
            fallback,
            list_lock: Mutex::new(()),
        }
    }

    /// Current value of `setting`, or its fallback when the key is absent
    ///
    /// An empty stored value counts as absent, so a blanked video URL is
    /// served as the fallback URL rather than as an empty string.
    pub async fn get(&self, setting: Setting) -> Result<SettingValue> {
        let raw = self.kv.get(setting.key()).await?;
        debug!(%setting, present = raw.is_some(), "read setting");

        match raw {
            None => Ok(self.fallback.value(setting)),
            Some(raw) if raw.is_empty() => Ok(self.fallback.value(setting)),
            Some(raw) if setting.is_numeric() => {
                if raw.trim().is_empty() {
                    return Ok(self.fallback.value(setting));
                }
                parse_epoch(setting.key(), &raw).map(SettingValue::Epoch)
            }
            Some(raw) => Ok(SettingValue::Text(raw)),
        }
    }

    /// Overwrite `setting`
    ///
    /// Callers validate input beforehand. The only check here is that the
    /// value kind matches the setting. The version is not bumped; call
    /// [`touch`](Self::touch) afterwards.
    pub async fn set(&self, setting: Setting, value: &SettingValue) -> Result<()> {
        match (setting.is_numeric(), value) {
            (true, SettingValue::Epoch(_)) | (false, SettingValue::Text(_)) => {}
            _ => {
                return Err(Error::validation(format!(
                    "{} does not accept {:?}",
                    setting, value
                )));
            }
        }

        self.kv.set(setting.key(), &value.to_raw()).await?;
        info!(%setting, "setting updated");
        Ok(())
    }

    /// Display title
    pub async fn title(&self) -> Result<String> {
        self.get_text(Setting::Title).await
    }

    /// Set the display title
    pub async fn set_title(&self, title: &str) -> Result<()> {
        self.set(Setting::Title, &SettingValue::Text(title.to_string()))
            .await
    }

    /// Primary video URL
    pub async fn video_url(&self) -> Result<String> {
        self.get_text(Setting::VideoUrl).await
    }

    /// Set the primary video URL
    pub async fn set_video_url(&self, url: &str) -> Result<()> {
        self.set(Setting::VideoUrl, &SettingValue::Text(url.to_string()))
            .await
    }

    /// Subtitle URL (empty when unset)
    pub async fn subtitle_url(&self) -> Result<String> {
        self.get_text(Setting::SubtitleUrl).await
    }

    /// Set the subtitle URL
    pub async fn set_subtitle_url(&self, url: &str) -> Result<()> {
        self.set(Setting::SubtitleUrl, &SettingValue::Text(url.to_string()))
            .await
    }

    /// Start time in whole Unix seconds
    pub async fn start_time(&self) -> Result<i64> {
        let value = self.get(Setting::StartTime).await?;
        value.as_epoch().ok_or_else(|| Error::MalformedValue {
            key: Setting::StartTime.key().to_string(),
            value: value.to_raw(),
        })
    }

    /// Set the start time
    pub async fn set_start_time(&self, epoch_secs: i64) -> Result<()> {
        self.set(Setting::StartTime, &SettingValue::Epoch(epoch_secs))
            .await
    }

    /// Record "now" as the last change time
    ///
    /// The value is written as fractional seconds; the returned whole-second
    /// timestamp is what [`current_version`](Self::current_version) reports.
    /// Concurrent touches race and the last write wins.
    pub async fn touch(&self) -> Result<i64> {
        let now = chrono::Utc::now();
        let millis = now.timestamp_millis();
        let raw = format!("{}.{:03}", millis.div_euclid(1000), millis.rem_euclid(1000));
        self.kv.set(VERSION_KEY, &raw).await?;
        debug!(update_ts = %raw, "config version touched");
        Ok(now.timestamp())
    }

    /// Last change time in whole Unix seconds, 0 if never touched
    pub async fn current_version(&self) -> Result<i64> {
        match self.kv.get(VERSION_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => parse_epoch(VERSION_KEY, &raw),
            _ => Ok(0),
        }
    }

    /// Read every setting, the mirror list and the version
    pub async fn snapshot(&self) -> Result<ConfigSnapshot> {
        Ok(ConfigSnapshot {
            title: self.title().await?,
            start: self.start_time().await?,
            url: self.video_url().await?,
            quality: self.list_backups().await?,
            subtitle: SubtitleView {
                url: self.subtitle_url().await?,
            },
            update_ts: self.current_version().await?,
        })
    }

    async fn get_text(&self, setting: Setting) -> Result<String> {
        let value = self.get(setting).await?;
        Ok(value.as_text().map_or_else(|| value.to_raw(), str::to_string))
    }
}

/// Parse a stored number, truncating any fractional part
fn parse_epoch(key: &str, raw: &str) -> Result<i64> {
    let malformed = || Error::MalformedValue {
        key: key.to_string(),
        value: raw.to_string(),
    };
    let value: f64 = raw.trim().parse().map_err(|_| malformed())?;
    if !value.is_finite() {
        return Err(malformed());
    }
    Ok(value.trunc() as i64)
}
