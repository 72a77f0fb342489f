//! Failing backend - always returns a configured error.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use backend_core::{Backend, BackendError, GenerateRequest};

/// A backend that fails every request with a fixed error.
///
/// Useful for exercising the router's fallback path.
pub struct FailingBackend {
    name: String,
    error: BackendError,
    calls: AtomicUsize,
}

impl FailingBackend {
    /// Create a failing backend with the given name and error.
    pub fn new(name: impl Into<String>, error: BackendError) -> Self {
        Self {
            name: name.into(),
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// Shorthand for a backend that is always unreachable.
    pub fn unreachable(name: impl Into<String>) -> Self {
        Self::new(name, BackendError::Unreachable("connection refused".to_string()))
    }

    /// Shorthand for a backend that is always rate limited.
    pub fn rate_limited(name: impl Into<String>) -> Self {
        Self::new(name, BackendError::RateLimited)
    }

    /// Number of generate calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Backend for FailingBackend {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_backend() {
        let backend = FailingBackend::unreachable("local");
        let result = backend.generate(&GenerateRequest::new("Hi")).await;

        assert!(matches!(result, Err(BackendError::Unreachable(_))));
        assert_eq!(backend.call_count(), 1);
        assert!(!backend.is_ready().await);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let backend = FailingBackend::rate_limited("cloud");
        let result = backend.generate(&GenerateRequest::new("Hi")).await;
        assert!(matches!(result, Err(BackendError::RateLimited)));
    }
}
