//! Configuration types for the configuration store service
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

use crate::fallback::{FALLBACK_SAMPLE_NAME, FALLBACK_VIDEO_URL};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Key-value store backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Values served when a key is absent from the store
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl ServiceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.server.validate()?;
        self.store.validate()?;
        self.fallback.validate()?;
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (e.g., "127.0.0.1:5000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Grace period for in-flight requests after a shutdown signal (in seconds)
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Validate the listener configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(crate::Error::config(format!(
                "Bind address is not a socket address: {}",
                self.bind_addr
            )));
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(crate::Error::config("Shutdown timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

/// Key-value store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store (not persistent)
    #[default]
    Memory,

    /// JSON file store
    File {
        /// Path to the store file
        path: String,
    },

    /// Redis server
    Redis {
        /// Connection URL (e.g., "redis://127.0.0.1:6379/0")
        url: String,
    },

    /// Custom store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::Memory => Ok(()),
            StoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("File store path cannot be empty"));
                }
                Ok(())
            }
            StoreConfig::Redis { url } => {
                if !url.starts_with("redis://")
                    && !url.starts_with("rediss://")
                    && !url.starts_with("redis+unix://")
                    && !url.starts_with("unix://")
                {
                    return Err(crate::Error::config(format!(
                        "Redis URL must use redis://, rediss:// or unix:// scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            StoreConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom store factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom store config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the store type name used for registry lookup
    pub fn type_name(&self) -> &str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::File { .. } => "file",
            StoreConfig::Redis { .. } => "redis",
            StoreConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Fallback values for absent keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Title served when none is set
    #[serde(default)]
    pub title: String,

    /// Known-good video served when no URL is set
    #[serde(default = "default_fallback_video_url")]
    pub video_url: String,

    /// Display name of the synthetic mirror entry
    #[serde(default = "default_fallback_sample_name")]
    pub sample_name: String,
}

impl FallbackConfig {
    /// Validate the fallback configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.video_url.is_empty() {
            return Err(crate::Error::config("Fallback video URL cannot be empty"));
        }
        Ok(())
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            video_url: default_fallback_video_url(),
            sample_name: default_fallback_sample_name(),
        }
    }
}

fn default_fallback_video_url() -> String {
    FALLBACK_VIDEO_URL.to_string()
}

fn default_fallback_sample_name() -> String {
    FALLBACK_SAMPLE_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ServiceConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.type_name(), "memory");
        assert_eq!(config.server.bind_addr, "127.0.0.1:5000");
    }

    #[test]
    fn test_store_config_tagged_json() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"type":"file","path":"/tmp/csmn.json"}"#).unwrap();
        assert_eq!(config.type_name(), "file");

        let config: StoreConfig =
            serde_json::from_str(r#"{"type":"redis","url":"redis://localhost:6379/0"}"#).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(StoreConfig::File { path: String::new() }.validate().is_err());
        assert!(
            StoreConfig::Redis {
                url: "http://localhost".to_string()
            }
            .validate()
            .is_err()
        );

        let server = ServerConfig {
            bind_addr: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert!(server.validate().is_err());

        let fallback = FallbackConfig {
            video_url: String::new(),
            ..FallbackConfig::default()
        };
        assert!(fallback.validate().is_err());
    }
}
