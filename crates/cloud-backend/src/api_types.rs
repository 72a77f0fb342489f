//! Wire types for the hosted messages API.

use serde::{Deserialize, Serialize};

/// Request body for a messages completion.
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<ApiMessage>,
}

/// One message in the request conversation.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl ApiMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Response body for a messages completion.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl MessagesResponse {
    /// The first text block in the response, if any.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text.as_deref())
    }
}

/// One content block in a response.
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Token usage reported by the API.
#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Error envelope returned on non-success status codes.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorDetail,
}

/// Error detail inside the envelope.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let json = r#"{
            "content": [{"type": "text", "text": "Hello there!"}],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;

        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("Hello there!"));
        assert_eq!(response.usage.unwrap().output_tokens, 5);
    }

    #[test]
    fn test_parse_response_no_text_block() {
        let json = r#"{"content": [{"type": "tool_use"}]}"#;
        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_parse_error_envelope() {
        let json = r#"{"error": {"type": "rate_limit_error", "message": "slow down"}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error.kind, "rate_limit_error");
        assert_eq!(envelope.error.message, "slow down");
    }

    #[test]
    fn test_serialize_request_skips_empty_system() {
        let request = MessagesRequest {
            model: "claude-test".to_string(),
            max_tokens: 128,
            system: None,
            messages: vec![ApiMessage::user("Hi")],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("system"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
