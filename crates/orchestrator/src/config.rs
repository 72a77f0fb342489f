//! Orchestrator configuration.

use std::env;
use std::time::Duration;

use backend_core::DEFAULT_MAX_TURNS;

/// Tunables for the orchestrator and its router.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Try the local backend first for every tier.
    pub prefer_local: bool,

    /// Deadline for one backend attempt.
    pub backend_timeout: Duration,

    /// Maximum turns retained per call.
    pub history_cap: usize,

    /// How many recent turns to send as context with each request.
    pub context_turns: usize,

    /// Default maximum tokens for a reply.
    pub max_tokens: u32,

    /// Business name woven into the system prompt.
    pub business_name: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            prefer_local: true,
            backend_timeout: Duration::from_secs(30),
            history_cap: DEFAULT_MAX_TURNS,
            context_turns: 10,
            max_tokens: 512,
            business_name: None,
        }
    }
}

impl OrchestratorConfig {
    /// Create configuration from environment variables.
    ///
    /// All optional:
    /// - `PREFER_LOCAL_AI` - "true"/"1" to prefer local for every tier (default: true)
    /// - `AI_TIMEOUT_SECS` - per-attempt deadline in seconds (default: 30)
    /// - `HISTORY_MAX_TURNS` - per-call history cap (default: 50)
    /// - `CONTEXT_TURNS` - recent turns sent per request (default: 10)
    /// - `AI_MAX_TOKENS` - max reply tokens (default: 512)
    /// - `BUSINESS_NAME` - business name for the system prompt
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let prefer_local = env::var("PREFER_LOCAL_AI")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(defaults.prefer_local);

        let backend_timeout = env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.backend_timeout);

        let history_cap = env::var("HISTORY_MAX_TURNS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.history_cap);

        let context_turns = env::var("CONTEXT_TURNS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.context_turns);

        let max_tokens = env::var("AI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tokens);

        let business_name = env::var("BUSINESS_NAME").ok().filter(|v| !v.is_empty());

        Self {
            prefer_local,
            backend_timeout,
            history_cap,
            context_turns,
            max_tokens,
            business_name,
        }
    }

    pub fn with_prefer_local(mut self, prefer_local: bool) -> Self {
        self.prefer_local = prefer_local;
        self
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }

    pub fn with_business_name(mut self, name: impl Into<String>) -> Self {
        self.business_name = Some(name.into());
        self
    }
}
