//! LocalBackend implementation over the local chat API.

use std::time::Duration;

use async_trait::async_trait;
use backend_core::{Backend, BackendError, GenerateRequest, Role};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::api_types::{ChatMessage, ChatOptions, ChatRequest, ChatResponse};
use crate::config::LocalBackendConfig;

/// Stable name used in logs, stats, and turn attribution.
pub const BACKEND_NAME: &str = "local";

/// Deadline for the health probe, independent of request deadlines.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend adapter for a local model server.
///
/// Picks a concrete model from the per-tier table using the request's
/// model hint, so simple utterances run on the small model and
/// complex ones on the large one.
pub struct LocalBackend {
    client: Client,
    config: LocalBackendConfig,
}

impl LocalBackend {
    /// Create a new LocalBackend with the given configuration.
    pub fn new(config: LocalBackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder().build().map_err(|e| {
            BackendError::Configuration(format!("failed to create HTTP client: {}", e))
        })?;

        info!(
            url = %config.base_url,
            fast = %config.models.fast,
            chat = %config.models.chat,
            smart = %config.models.smart,
            "local backend initialized"
        );

        Ok(Self { client, config })
    }

    /// Create a LocalBackend from environment variables.
    ///
    /// See [`LocalBackendConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(LocalBackendConfig::from_env())
    }

    /// Get the configuration.
    pub fn config(&self) -> &LocalBackendConfig {
        &self.config
    }

    /// Probe the server's tags endpoint.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        let probe = self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await;

        match probe {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("local backend health check failed: {}", e);
                false
            }
        }
    }

    fn build_messages(request: &GenerateRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(request.context.len() + 2);

        if let Some(ref prompt) = request.system_prompt {
            messages.push(ChatMessage::system(prompt.clone()));
        }

        for turn in &request.context {
            match turn.role {
                Role::Caller => messages.push(ChatMessage::user(turn.text.clone())),
                Role::Assistant => messages.push(ChatMessage::assistant(turn.text.clone())),
                Role::System => messages.push(ChatMessage::system(turn.text.clone())),
            }
        }

        messages.push(ChatMessage::user(request.utterance.clone()));
        messages
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        let model = self.config.models.select(request.model_hint.as_deref());
        let url = format!("{}/api/chat", self.config.base_url);

        let body = ChatRequest {
            model: model.to_string(),
            messages: Self::build_messages(request),
            stream: false,
            options: ChatOptions {
                num_predict: request.max_tokens.min(self.config.max_tokens),
                temperature: self.config.temperature,
            },
        };

        debug!(model = %body.model, messages = body.messages.len(), "sending local request");

        let send = self.client.post(&url).json(&body).send();

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
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited,
                s if s.is_server_error() => {
                    BackendError::Unreachable(format!("server error {}", s.as_u16()))
                }
                s => BackendError::InvalidResponse(format!(
                    "API error {}: {}",
                    s.as_u16(),
                    error_text
                )),
            });
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            BackendError::InvalidResponse(format!("failed to parse response: {}", e))
        })?;

        let text = completion
            .message
            .map(|m| m.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                warn!(model = %model, "local backend returned an empty reply");
                BackendError::InvalidResponse("empty reply".to_string())
            })?;

        debug!(model = %model, chars = text.len(), "local reply generated");
        Ok(text)
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn is_ready(&self) -> bool {
        self.check_health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_core::Turn;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP server returning a canned response.
    async fn stub_server(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\
                     connection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}", addr)
    }

    fn config_for(url: String) -> LocalBackendConfig {
        LocalBackendConfig {
            base_url: url,
            ..LocalBackendConfig::default()
        }
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let url = stub_server(
            "HTTP/1.1 200 OK",
            r#"{"message": {"role": "assistant", "content": "Hi! How can I help?"}}"#,
        )
        .await;
        let backend = LocalBackend::new(config_for(url)).unwrap();

        let reply = backend.generate(&GenerateRequest::new("Hi")).await.unwrap();
        assert_eq!(reply, "Hi! How can I help?");
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_rate_limited() {
        let url = stub_server("HTTP/1.1 429 Too Many Requests", "{}").await;
        let backend = LocalBackend::new(config_for(url)).unwrap();

        let result = backend.generate(&GenerateRequest::new("Hi")).await;
        assert!(matches!(result, Err(BackendError::RateLimited)));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_unreachable() {
        let url = stub_server("HTTP/1.1 500 Internal Server Error", "{}").await;
        let backend = LocalBackend::new(config_for(url)).unwrap();

        let result = backend.generate(&GenerateRequest::new("Hi")).await;
        assert!(matches!(result, Err(BackendError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_blank_reply_is_invalid_response() {
        let url = stub_server(
            "HTTP/1.1 200 OK",
            r#"{"message": {"role": "assistant", "content": "   "}}"#,
        )
        .await;
        let backend = LocalBackend::new(config_for(url)).unwrap();

        let result = backend.generate(&GenerateRequest::new("Hi")).await;
        assert!(matches!(result, Err(BackendError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_health_probe_up() {
        let url = stub_server("HTTP/1.1 200 OK", r#"{"models": []}"#).await;
        let backend = LocalBackend::new(config_for(url)).unwrap();

        assert!(backend.is_ready().await);
    }

    #[tokio::test]
    async fn test_health_probe_down() {
        // Bind then drop so the port is closed when the probe connects.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = LocalBackend::new(config_for(format!("http://{}", addr))).unwrap();

        assert!(!backend.is_ready().await);
    }

    #[test]
    fn test_backend_name() {
        let backend = LocalBackend::new(LocalBackendConfig::default()).unwrap();
        assert_eq!(backend.name(), "local");
    }

    #[test]
    fn test_build_messages_with_history() {
        let request = GenerateRequest::new("Is it ready yet?")
            .with_system_prompt("Be brief.")
            .with_context(vec![
                Turn::caller("Checking on my car"),
                Turn::assistant_via("It's in the shop.", "local"),
            ]);

        let messages = LocalBackend::build_messages(&request);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].content, "Is it ready yet?");
    }

    #[test]
    fn test_build_messages_no_system_prompt() {
        let messages = LocalBackend::build_messages(&GenerateRequest::new("Hi"));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }
}
