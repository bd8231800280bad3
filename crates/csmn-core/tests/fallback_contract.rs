//! Contract Test: Fallback Values
//!
//! Constraints verified:
//! - Every setting reads its fallback from an empty store
//! - After one set, the stored value wins
//! - Store failures propagate instead of falling back

mod common;

use common::*;
use csmn_core::fallback::FALLBACK_VIDEO_URL;
use csmn_core::{ConfigStore, Error, FallbackTable, Setting, SettingValue};
use std::sync::Arc;

#[tokio::test]
async fn empty_store_serves_fallback_for_every_setting() {
    let (store, _) = memory_config_store();
    let fallback = FallbackTable::default();

    for setting in Setting::ALL {
        assert_eq!(
            store.get(setting).await.unwrap(),
            fallback.value(setting),
            "fallback mismatch for {setting}"
        );
    }
}

#[tokio::test]
async fn set_value_replaces_fallback() {
    let (store, _) = memory_config_store();

    let values = [
        (Setting::Title, SettingValue::Text("Night stream".to_string())),
        (Setting::VideoUrl, SettingValue::Text("https://v/1.mp4".to_string())),
        (Setting::SubtitleUrl, SettingValue::Text("https://v/1.vtt".to_string())),
        (Setting::StartTime, SettingValue::Epoch(1_700_000_000)),
    ];

    for (setting, value) in &values {
        store.set(*setting, value).await.unwrap();
    }
    for (setting, value) in &values {
        assert_eq!(&store.get(*setting).await.unwrap(), value);
    }
}

#[tokio::test]
async fn empty_list_serves_single_synthetic_default() {
    let (store, _) = memory_config_store();

    let backups = store.list_backups().await.unwrap();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].default);
    assert_eq!(backups[0].url, FALLBACK_VIDEO_URL);

    // The synthetic entry is never written
    assert!(store.stored_backups().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_store_is_not_masked_by_fallback() {
    let store = ConfigStore::new(Arc::new(UnreachableKvStore), FallbackTable::default());

    assert!(matches!(
        store.title().await,
        Err(Error::StoreUnavailable(_))
    ));
    assert!(matches!(
        store.list_backups().await,
        Err(Error::StoreUnavailable(_))
    ));
    assert!(matches!(
        store.current_version().await,
        Err(Error::StoreUnavailable(_))
    ));
}
