//! CloudBackend implementation over the hosted messages API.

use async_trait::async_trait;
use backend_core::{Backend, BackendError, GenerateRequest, Role};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::api_types::{ApiErrorEnvelope, ApiMessage, MessagesRequest, MessagesResponse};
use crate::config::CloudBackendConfig;

/// Stable name used in logs, stats, and turn attribution.
pub const BACKEND_NAME: &str = "cloud";

/// Backend adapter for the hosted high-capability model.
///
/// Stateless between requests: the bounded conversation context
/// arrives inside each [`GenerateRequest`]. All transport failures,
/// deadline overruns, and malformed replies map to [`BackendError`]
/// variants that trigger router fallback.
pub struct CloudBackend {
    client: Client,
    config: CloudBackendConfig,
}

impl CloudBackend {
    /// Create a new CloudBackend with the given configuration.
    pub fn new(config: CloudBackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder().build().map_err(|e| {
            BackendError::Configuration(format!("failed to create HTTP client: {}", e))
        })?;

        info!(model = %config.model, "cloud backend initialized");

        Ok(Self { client, config })
    }

    /// Create a CloudBackend from environment variables.
    ///
    /// See [`CloudBackendConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(CloudBackendConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &CloudBackendConfig {
        &self.config
    }

    /// Map conversation context turns onto API messages.
    ///
    /// System turns are folded into the system prompt; caller turns
    /// become user messages and assistant turns assistant messages.
    fn build_messages(request: &GenerateRequest) -> (Option<String>, Vec<ApiMessage>) {
        let mut system = request.system_prompt.clone();
        let mut messages = Vec::with_capacity(request.context.len() + 1);

        for turn in &request.context {
            match turn.role {
                Role::Caller => messages.push(ApiMessage::user(turn.text.clone())),
                Role::Assistant => messages.push(ApiMessage::assistant(turn.text.clone())),
                Role::System => {
                    let note = turn.text.clone();
                    system = Some(match system {
                        Some(existing) => format!("{}\n\n{}", existing, note),
                        None => note,
                    });
                }
            }
        }

        messages.push(ApiMessage::user(request.utterance.clone()));
        (system, messages)
    }

    async fn messages_completion(
        &self,
        request: &GenerateRequest,
    ) -> Result<MessagesResponse, BackendError> {
        let url = format!("{}/v1/messages", self.config.api_url);
        let (system, messages) = Self::build_messages(request);

        let body = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: request.max_tokens.min(self.config.max_tokens),
            system,
            messages,
        };

        debug!(model = %body.model, messages = body.messages.len(), "sending cloud request");

        let send = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send();

        let response = tokio::time::timeout(self.config.timeout, send)
            .await
            .map_err(|_| BackendError::Timeout)?
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_text);

            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited,
                s if s.is_server_error() => {
                    BackendError::Unreachable(format!("server error {}: {}", s.as_u16(), detail))
                }
                s => BackendError::InvalidResponse(format!(
                    "API error {}: {}",
                    s.as_u16(),
                    detail
                )),
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Backend for CloudBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        let completion = self.messages_completion(request).await?;

        let text = completion
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("cloud backend returned an empty reply");
                BackendError::InvalidResponse("empty reply".to_string())
            })?
            .to_string();

        if let Some(usage) = &completion.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "cloud token usage"
            );
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}
