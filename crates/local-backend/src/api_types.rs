//! Wire types for the local chat API.

use serde::{Deserialize, Serialize};

/// Request body for a chat completion.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

/// Sampling options.
#[derive(Debug, Serialize)]
pub struct ChatOptions {
    pub num_predict: u32,
    pub temperature: f32,
}

/// One message in the chat request.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

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

/// Response body for a chat completion.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

/// The generated message inside a chat response.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let json = r#"{"message": {"role": "assistant", "content": "Hi!"}}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.message.unwrap().content, "Hi!");
    }

    #[test]
    fn test_parse_chat_response_missing_message() {
        let json = r#"{"done": true}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.message.is_none());
    }

    #[test]
    fn test_serialize_request() {
        let request = ChatRequest {
            model: "quick-responder:latest".to_string(),
            messages: vec![ChatMessage::system("prompt"), ChatMessage::user("Hi")],
            stream: false,
            options: ChatOptions {
                num_predict: 128,
                temperature: 0.7,
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("\"num_predict\":128"));
    }
}
