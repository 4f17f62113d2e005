//! Client configuration.
//!
//! The backend address is resolved once, before the conversation controller
//! is built, and never changes afterwards.

use std::time::Duration;

/// Local development address used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Environment variable holding the backend base URL.
pub const ENDPOINT_ENV: &str = "BISTRO_BACKEND_URL";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path of the chat operation, relative to the endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Settings for talking to the chat backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub endpoint: String,

    /// Timeout in seconds for one chat request.
    pub timeout_seconds: u64,
}

impl ClientConfig {
    /// Resolve a configuration from an optional explicit endpoint.
    ///
    /// `None` or a blank value selects [`DEFAULT_ENDPOINT`].
    pub fn resolve(endpoint: Option<&str>) -> Result<Self, ConfigError> {
        let endpoint = endpoint
            .map(normalize_endpoint)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let config = Self {
            endpoint,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve the endpoint from [`ENDPOINT_ENV`], falling back to the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = std::env::var(ENDPOINT_ENV).ok();
        Self::resolve(value.as_deref())
    }

    /// Override the request timeout.
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Result<Self, ConfigError> {
        self.timeout_seconds = seconds;
        self.validate()?;
        Ok(self)
    }

    /// Check that the endpoint is an absolute http(s) URL and the timeout is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Full URL of the chat operation.
    pub fn chat_url(&self) -> String {
        format!("{}{CHAT_PATH}", self.endpoint)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn normalize_endpoint(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Errors that can occur when resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Endpoint is not an absolute http(s) URL.
    #[error("Invalid backend URL '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A zero timeout would fail every request.
    #[error("Request timeout must be at least one second")]
    ZeroTimeout,
}
