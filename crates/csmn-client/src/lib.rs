// # CSMN Config Client
//
// HTTP client for the csmnd daemon API. This is what operator front ends
// (such as a chat bot) use to read and change the configuration.
//
// ## Endpoints
//
// - `GET  /api/config`: full [`ConfigSnapshot`]
// - `POST /api/config`: form fields `key` and `val`, answered with a [`Reply`]
//
// Commands are decoded locally before anything is sent, so an unknown
// option never reaches the daemon.

use csmn_core::{ConfigCommand, ConfigSnapshot, Reply};

use std::time::Duration;

/// Path of the config endpoint
const CONFIG_PATH: &str = "/api/config";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client-side errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("upstream responded with code {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// Command rejected before sending
    #[error(transparent)]
    Command(#[from] csmn_core::Error),
}

/// Result type alias for client calls
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client for one csmnd instance
#[derive(Debug, Clone)]
pub struct ConfigClient {
    base_url: String,
    client: reqwest::Client,
}

impl ConfigClient {
    /// Create a client for the daemon at `base_url` (e.g. "http://127.0.0.1:5000")
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout
    ///
    /// # Errors
    ///
    /// [`ClientError::Http`] if the HTTP client cannot be built
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CONFIG_PATH)
    }

    /// Fetch the full configuration
    pub async fn fetch_config(&self) -> Result<ConfigSnapshot> {
        let response = self.client.get(self.endpoint()).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Apply a decoded command
    pub async fn apply(&self, command: &ConfigCommand) -> Result<Reply> {
        let (key, val) = command.to_wire()?;
        self.post(key, &val).await
    }

    /// Set an option from operator words, e.g. `("cdn", ["add", "m1", "https://m1"])`
    ///
    /// The words are joined with single spaces, decoded, then sent.
    pub async fn set_option(&self, key: &str, args: &[&str]) -> Result<Reply> {
        let val = args.join(" ");
        ConfigCommand::parse(key, &val)?;
        self.post(key, &val).await
    }

    async fn post(&self, key: &str, val: &str) -> Result<Reply> {
        tracing::debug!(key, val, "posting config change");
        let response = self
            .client
            .post(self.endpoint())
            .form(&[("key", key), ("val", val)])
            .send()
            .await?;
        let response = check_status(response).await?;
        let reply: Reply = response.json().await?;
        if !reply.is_ok() {
            tracing::warn!(key, val, code = reply.code, "config change rejected: {}", reply.msg);
        }
        Ok(reply)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}
