//! Error types for the CSMN configuration store
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for configuration store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the configuration store
#[derive(Error, Debug)]
pub enum Error {
    /// The key-value collaborator could not be reached or failed the call
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// List index beyond the current list length
    #[error("Index {index} out of range for list '{key}'")]
    OutOfRange {
        /// List key
        key: String,
        /// Requested index
        index: usize,
    },

    /// A stored backup entry could not be decoded into `{name, url}`
    #[error("Malformed record at index {index}: {message}")]
    MalformedRecord {
        /// Physical list index of the bad record
        index: usize,
        /// Decoder message
        message: String,
    },

    /// A stored scalar could not be coerced to its setting's type
    #[error("Malformed value for '{key}': {value:?}")]
    MalformedValue {
        /// Store key
        key: String,
        /// Raw stored text
        value: String,
    },

    /// Caller input rejected before it reached the store
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Wire key that maps to no setting
    #[error("not supported: key = {key}, val = {val}")]
    UnsupportedOption {
        /// Requested key
        key: String,
        /// Raw value
        val: String,
    },

    /// Unknown sub-command under the `cdn` option
    #[error("backup_urls: unsupported sub command: {0}")]
    UnsupportedSubcommand(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors (file-backed store)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a store-unavailable error
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create an out-of-range error
    pub fn out_of_range(key: impl Into<String>, index: usize) -> Self {
        Self::OutOfRange {
            key: key.into(),
            index,
        }
    }

    /// Create a malformed-record error
    pub fn malformed(index: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an unsupported-option error
    pub fn unsupported_option(key: impl Into<String>, val: impl Into<String>) -> Self {
        Self::UnsupportedOption {
            key: key.into(),
            val: val.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Reply code reported to remote callers.
    ///
    /// `1` and `2` are reserved for decoding failures of the option key and
    /// the `cdn` sub-command; everything else is `-1`.
    pub fn reply_code(&self) -> i32 {
        match self {
            Error::UnsupportedOption { .. } => 1,
            Error::UnsupportedSubcommand(_) => 2,
            _ => -1,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
