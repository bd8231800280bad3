// # Key-Value Store Implementations
//
// This module provides implementations of the KeyValueStore trait for
// different persistence strategies.

mod data;
pub mod file;
pub mod memory;

pub use file::{FileKvStore, FileKvStoreFactory};
pub use memory::{MemoryKvStore, MemoryKvStoreFactory};
