//! Core traits for the configuration store
//!
//! This module defines the abstract interfaces that store backends must follow.
//!
//! - [`KeyValueStore`]: Scalar get/set plus an ordered list primitive
//! - [`KvStoreFactory`]: Builds a store from [`StoreConfig`](crate::config::StoreConfig)

pub mod kv_store;

pub use kv_store::{KeyValueStore, KvStoreFactory};
