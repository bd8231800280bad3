//! Data model for settings, backup mirrors and the served snapshot

use serde::{Deserialize, Serialize};

/// Store key of the backup mirror list
pub const BACKUP_LIST_KEY: &str = "csmn_backup_urls";

/// Store key of the change timestamp
pub const VERSION_KEY: &str = "csmn_config_update_ts";

/// A named scalar setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setting {
    /// Display title
    Title,
    /// Primary video URL
    VideoUrl,
    /// Subtitle URL, may be empty
    SubtitleUrl,
    /// Start time in Unix epoch seconds
    StartTime,
}

impl Setting {
    /// Every setting, in display order
    pub const ALL: [Setting; 4] = [
        Setting::Title,
        Setting::VideoUrl,
        Setting::SubtitleUrl,
        Setting::StartTime,
    ];

    /// Fixed store key for this setting
    pub fn key(self) -> &'static str {
        match self {
            Setting::Title => "csmn_title",
            Setting::VideoUrl => "csmn_video_url",
            Setting::SubtitleUrl => "csmn_subs_url",
            Setting::StartTime => "csmn_start",
        }
    }

    /// Whether the setting holds an epoch rather than text
    pub fn is_numeric(self) -> bool {
        matches!(self, Setting::StartTime)
    }
}

impl std::fmt::Display for Setting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Setting::Title => "title",
            Setting::VideoUrl => "video_url",
            Setting::SubtitleUrl => "subtitle_url",
            Setting::StartTime => "start_time",
        };
        f.write_str(name)
    }
}

/// Current value of a setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Text settings (title, URLs)
    Text(String),
    /// Whole Unix seconds
    Epoch(i64),
}

impl SettingValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(text) => Some(text),
            SettingValue::Epoch(_) => None,
        }
    }

    /// Epoch seconds, if this is a numeric value
    pub fn as_epoch(&self) -> Option<i64> {
        match self {
            SettingValue::Epoch(secs) => Some(*secs),
            SettingValue::Text(_) => None,
        }
    }

    /// Raw representation written to the store
    pub(crate) fn to_raw(&self) -> String {
        match self {
            SettingValue::Text(text) => text.clone(),
            SettingValue::Epoch(secs) => secs.to_string(),
        }
    }
}

/// One backup mirror as persisted in the list
///
/// The persisted record carries only `name` and `url`. Whether an entry is
/// the default is derived from its position at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Display name
    pub name: String,
    /// Mirror URL
    pub url: String,
}

impl BackupEntry {
    /// Create a new entry
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A backup mirror as rendered to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupView {
    /// Display name
    pub name: String,
    /// Mirror URL
    pub url: String,
    /// True only for the entry at position 0
    pub default: bool,
}

/// Outcome of a positional removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The entry at the index was removed
    Removed {
        /// Index that was removed
        index: usize,
        /// The removed entry, `None` if its record could not be decoded
        entry: Option<BackupEntry>,
    },
    /// The index was past the end; the list is unchanged
    OutOfRange {
        /// Requested index
        index: usize,
        /// List length observed during the attempt
        len: usize,
    },
}

impl RemoveOutcome {
    /// Whether the list was modified
    pub fn is_removed(&self) -> bool {
        matches!(self, RemoveOutcome::Removed { .. })
    }
}

/// Subtitle block of the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleView {
    /// Subtitle URL, empty when unset
    pub url: String,
}

/// Full read view of the configuration
///
/// Field names follow the wire format consumed by players and the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Display title
    pub title: String,
    /// Start time (Unix seconds)
    pub start: i64,
    /// Primary video URL
    pub url: String,
    /// Backup mirrors, default first
    pub quality: Vec<BackupView>,
    /// Subtitle settings
    pub subtitle: SubtitleView,
    /// Last change timestamp (Unix seconds)
    pub update_ts: i64,
}
