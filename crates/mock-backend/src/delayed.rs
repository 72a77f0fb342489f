//! Delayed backend - wraps another backend with artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use backend_core::{Backend, BackendError, GenerateRequest};
use tokio::time::sleep;

/// A backend that wraps another backend and adds artificial delay.
///
/// Useful for testing deadline handling and call-end cancellation.
pub struct DelayedBackend<B: Backend> {
    inner: B,
    delay: Duration,
}

impl<B: Backend> DelayedBackend<B> {
    /// Wrap `inner` with the given delay before each request.
    pub fn new(inner: B, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Wrap `inner` with a delay in milliseconds.
    pub fn with_millis(inner: B, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<B: Backend> Backend for DelayedBackend<B> {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        sleep(self.delay).await;
        self.inner.generate(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn is_ready(&self) -> bool {
        self.inner.is_ready().await
    }
}
