//! Scripted backend - returns a fixed reply and records requests.

use std::sync::Mutex;

use async_trait::async_trait;
use backend_core::{Backend, BackendError, GenerateRequest};

/// A backend that always returns the same reply.
///
/// Every request is recorded so tests can assert on what the router
/// actually sent (context size, model hint, system prompt).
pub struct ScriptedBackend {
    name: String,
    reply: String,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedBackend {
    /// Create a scripted backend with the given name and reply.
    pub fn new(name: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Copies of every request received so far.
    pub fn recorded_requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
