//! Contract Test: Change Timestamp
//!
//! Constraints verified:
//! - The version starts at 0
//! - Every applied mutation bumps it; serial use never moves it backwards
//! - The reported version equals the last touch, whole seconds
//!
//! Value and version are separate writes, so nothing here assumes an
//! atomic value+version snapshot.

mod common;

use common::*;
use csmn_core::{BackupCommand, CommandOutcome, ConfigCommand, ConfigService};
use std::sync::Arc;

fn service() -> ConfigService {
    let (store, _) = memory_config_store();
    ConfigService::new(Arc::new(store))
}

#[tokio::test]
async fn version_is_zero_before_any_mutation() {
    let service = service();
    assert_eq!(service.store().current_version().await.unwrap(), 0);
    assert_eq!(service.snapshot().await.unwrap().update_ts, 0);
}

#[tokio::test]
async fn serial_mutations_never_decrease_version() {
    let service = service();
    let commands = vec![
        ConfigCommand::SetTitle("t".to_string()),
        ConfigCommand::SetVideoUrl("https://v".to_string()),
        ConfigCommand::SetSubtitleUrl("https://s".to_string()),
        ConfigCommand::SetStartTime(1_700_000_000),
        ConfigCommand::Backup(BackupCommand::Append {
            name: "m1".to_string(),
            url: "https://m1".to_string(),
        }),
        ConfigCommand::Backup(BackupCommand::ReplaceAt {
            index: 0,
            name: "m0".to_string(),
            url: "https://m0".to_string(),
        }),
        ConfigCommand::Backup(BackupCommand::RemoveAt { index: 0 }),
    ];

    let mut previous = 0;
    for command in &commands {
        let outcome = service.apply(command).await.unwrap();
        let CommandOutcome::Applied { update_ts } = &outcome else {
            panic!("{command:?} should apply, got {outcome:?}");
        };
        let current = service.store().current_version().await.unwrap();
        assert_eq!(current, *update_ts);
        assert!(current >= previous, "version went backwards");
        previous = current;
    }
}

#[tokio::test]
async fn version_tracks_wall_clock() {
    let service = service();
    let before = chrono::Utc::now().timestamp();
    service
        .apply(&ConfigCommand::SetTitle("t".to_string()))
        .await
        .unwrap();
    let after = chrono::Utc::now().timestamp();

    let version = service.store().current_version().await.unwrap();
    assert!((before..=after).contains(&version));
}

#[tokio::test]
async fn failed_mutation_does_not_bump_version() {
    let service = service();
    let result = service
        .apply(&ConfigCommand::Backup(BackupCommand::ReplaceAt {
            index: 5,
            name: "x".to_string(),
            url: "https://x".to_string(),
        }))
        .await;
    assert!(result.is_err());
    assert_eq!(service.store().current_version().await.unwrap(), 0);
}
