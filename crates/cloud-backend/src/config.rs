//! Configuration for the cloud backend adapter.

use std::env;
use std::time::Duration;

use backend_core::BackendError;

/// Configuration for [`CloudBackend`](crate::CloudBackend).
#[derive(Debug, Clone)]
pub struct CloudBackendConfig {
    /// API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Default maximum tokens for a reply.
    pub max_tokens: u32,

    /// Per-request deadline.
    pub timeout: Duration,
}

impl Default for CloudBackendConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com".to_string(),
            api_key: String::new(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CloudBackendConfig {
    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `CLOUD_API_KEY` - API key for authentication
    ///
    /// Optional:
    /// - `CLOUD_API_URL` - API base URL (default: https://api.anthropic.com)
    /// - `CLOUD_MODEL` - Model name (default: claude-3-5-sonnet-20241022)
    /// - `CLOUD_MAX_TOKENS` - Max reply tokens (default: 1024)
    /// - `CLOUD_TIMEOUT_SECS` - Request deadline in seconds (default: 30)
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = env::var("CLOUD_API_KEY")
            .map_err(|_| BackendError::Configuration("CLOUD_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        let api_url = env::var("CLOUD_API_URL").unwrap_or(defaults.api_url);
        let model = env::var("CLOUD_MODEL").unwrap_or(defaults.model);

        let max_tokens = env::var("CLOUD_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tokens);

        let timeout = env::var("CLOUD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> CloudBackendConfigBuilder {
        CloudBackendConfigBuilder::default()
    }
}

/// Builder for [`CloudBackendConfig`].
#[derive(Debug, Default)]
pub struct CloudBackendConfigBuilder {
    config: CloudBackendConfig,
}

impl CloudBackendConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the max reply tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    /// Set the per-request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CloudBackendConfig {
        self.config
    }
}
