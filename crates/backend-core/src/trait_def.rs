//! The Backend trait definition.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::turn::Turn;

/// A request to generate one assistant reply.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// The caller utterance (or summarization instruction) to answer.
    pub utterance: String,
    /// Optional system prompt framing the conversation.
    pub system_prompt: Option<String>,
    /// Bounded conversation context, oldest first.
    pub context: Vec<Turn>,
    /// Maximum tokens for the reply.
    pub max_tokens: u32,
    /// Abstract model tier hint ("fast", "chat", "smart").
    ///
    /// Adapters with a tiered model table map this to a concrete
    /// model; adapters with a single model ignore it.
    pub model_hint: Option<String>,
}

impl GenerateRequest {
    /// Create a request with defaults (512 tokens, no context).
    pub fn new(utterance: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            system_prompt: None,
            context: Vec::new(),
            max_tokens: 512,
            model_hint: None,
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the conversation context.
    pub fn with_context(mut self, context: Vec<Turn>) -> Self {
        self.context = context;
        self
    }

    /// Set the maximum reply tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the model tier hint.
    pub fn with_model_hint(mut self, hint: impl Into<String>) -> Self {
        self.model_hint = Some(hint.into());
        self
    }
}

/// A language-model backend capable of generating a reply.
///
/// Implementations range from scripted test doubles to HTTP adapters.
/// The trait is object-safe and used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Generate a reply for the given request.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError>;

    /// A short stable name for this backend, used in logs and stats.
    fn name(&self) -> &str;

    /// Whether the backend is reachable and ready.
    ///
    /// Default implementation always returns true; adapters with a
    /// health endpoint override this.
    async fn is_ready(&self) -> bool {
        true
    }
}
