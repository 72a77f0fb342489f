//! Configuration for the local backend adapter.

use std::env;
use std::time::Duration;

/// Models for the local server, one per complexity tier.
#[derive(Debug, Clone)]
pub struct ModelTable {
    /// Small model for greetings and short confirmations.
    pub fast: String,
    /// Conversational model for standard inquiries.
    pub chat: String,
    /// Large model for complex queries.
    pub smart: String,
}

impl Default for ModelTable {
    fn default() -> Self {
        Self {
            fast: "quick-responder:latest".to_string(),
            chat: "cyberque-chat:latest".to_string(),
            smart: "llama3.3:70b".to_string(),
        }
    }
}

impl ModelTable {
    /// Select a model by tier hint. Unknown hints get the chat model.
    pub fn select(&self, hint: Option<&str>) -> &str {
        match hint {
            Some("fast") => &self.fast,
            Some("smart") => &self.smart,
            _ => &self.chat,
        }
    }
}

/// Configuration for [`LocalBackend`](crate::LocalBackend).
#[derive(Debug, Clone)]
pub struct LocalBackendConfig {
    /// Local model server base URL.
    pub base_url: String,

    /// Per-tier model table.
    pub models: ModelTable,

    /// Default maximum tokens for a reply.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Per-request deadline.
    pub timeout: Duration,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            models: ModelTable::default(),
            max_tokens: 512,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

impl LocalBackendConfig {
    /// Create configuration from environment variables.
    ///
    /// All optional:
    /// - `LOCAL_AI_URL` - server base URL (default: http://127.0.0.1:11434)
    /// - `LOCAL_FAST_MODEL` - fast-tier model (default: quick-responder:latest)
    /// - `LOCAL_CHAT_MODEL` - chat-tier model (default: cyberque-chat:latest)
    /// - `LOCAL_SMART_MODEL` - smart-tier model (default: llama3.3:70b)
    /// - `LOCAL_MAX_TOKENS` - max reply tokens (default: 512)
    /// - `LOCAL_TIMEOUT_SECS` - request deadline in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = env::var("LOCAL_AI_URL").unwrap_or(defaults.base_url);
        let models = ModelTable {
            fast: env::var("LOCAL_FAST_MODEL").unwrap_or(defaults.models.fast),
            chat: env::var("LOCAL_CHAT_MODEL").unwrap_or(defaults.models.chat),
            smart: env::var("LOCAL_SMART_MODEL").unwrap_or(defaults.models.smart),
        };

        let max_tokens = env::var("LOCAL_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tokens);

        let timeout = env::var("LOCAL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            models,
            max_tokens,
            temperature: defaults.temperature,
            timeout,
        }
    }
}
