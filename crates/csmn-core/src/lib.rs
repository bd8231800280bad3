// # csmn-core
//
// Core library for the CSMN versioned configuration store.
//
// ## Architecture Overview
//
// - **KeyValueStore**: Trait for the scalar + list store everything lives in
// - **FallbackTable**: Values served when a key is absent
// - **ConfigStore**: Typed settings, ordered mirror list, change timestamp
// - **ConfigCommand**: Mutations decoded once from the wire `(key, val)` pair
// - **ConfigService**: Applies commands and bumps the version
// - **StoreRegistry**: Plugin-based registry of store backends
//
// ## Design Principles
//
// 1. **Store is the source of truth**: nothing is cached between calls
// 2. **Injected store handle**: no process-wide connection pool
// 3. **Positional default**: the first mirror is the default, derived at read time
// 4. **Library-First**: the daemon is a thin layer over this crate

pub mod command;
pub mod config;
pub mod error;
pub mod fallback;
pub mod kv;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use command::{BackupCommand, ConfigCommand};
pub use config::{FallbackConfig, ServerConfig, ServiceConfig, StoreConfig};
pub use error::{Error, Result};
pub use fallback::FallbackTable;
pub use kv::{FileKvStore, MemoryKvStore};
pub use model::{BackupEntry, BackupView, ConfigSnapshot, RemoveOutcome, Setting, SettingValue};
pub use registry::StoreRegistry;
pub use service::{CommandOutcome, ConfigService, Reply};
pub use store::ConfigStore;
pub use traits::{KeyValueStore, KvStoreFactory};
