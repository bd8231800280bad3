//! Values served when a key is absent from the store
//!
//! The table is built once at startup and never mutated afterwards.

use crate::config::FallbackConfig;
use crate::model::{BackupEntry, Setting, SettingValue};

/// Known-good reference video
pub const FALLBACK_VIDEO_URL: &str =
    "https://zhw2590582.github.io/assets-cdn/video/one-more-time-one-more-chance-480p.mp4";

/// Display name of the synthetic mirror entry
pub const FALLBACK_SAMPLE_NAME: &str = "未设置 (Sample)";

/// Read-only defaults for every setting and for the mirror list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    title: String,
    video_url: String,
    subtitle_url: String,
    start_time: i64,
    sample: BackupEntry,
}

impl FallbackTable {
    /// Build the table from configuration
    pub fn from_config(config: &FallbackConfig) -> Self {
        Self {
            title: config.title.clone(),
            video_url: config.video_url.clone(),
            subtitle_url: String::new(),
            start_time: 0,
            sample: BackupEntry::new(config.sample_name.clone(), config.video_url.clone()),
        }
    }

    /// Value served for `setting` when the store has none
    pub fn value(&self, setting: Setting) -> SettingValue {
        match setting {
            Setting::Title => SettingValue::Text(self.title.clone()),
            Setting::VideoUrl => SettingValue::Text(self.video_url.clone()),
            Setting::SubtitleUrl => SettingValue::Text(self.subtitle_url.clone()),
            Setting::StartTime => SettingValue::Epoch(self.start_time),
        }
    }

    /// Synthetic mirror served when the list is empty
    pub fn sample_backup(&self) -> &BackupEntry {
        &self.sample
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::from_config(&FallbackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_values() {
        let table = FallbackTable::default();
        assert_eq!(table.value(Setting::Title), SettingValue::Text(String::new()));
        assert_eq!(
            table.value(Setting::VideoUrl),
            SettingValue::Text(FALLBACK_VIDEO_URL.to_string())
        );
        assert_eq!(
            table.value(Setting::SubtitleUrl),
            SettingValue::Text(String::new())
        );
        assert_eq!(table.value(Setting::StartTime), SettingValue::Epoch(0));
        assert_eq!(table.sample_backup().url, FALLBACK_VIDEO_URL);
    }

    #[test]
    fn test_configured_video_url_feeds_sample() {
        let config = FallbackConfig {
            video_url: "https://cdn.example/ok.mp4".to_string(),
            ..FallbackConfig::default()
        };
        let table = FallbackTable::from_config(&config);
        assert_eq!(table.sample_backup().url, "https://cdn.example/ok.mp4");
        assert_eq!(table.sample_backup().name, FALLBACK_SAMPLE_NAME);
    }
}
