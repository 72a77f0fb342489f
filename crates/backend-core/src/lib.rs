//! Core trait and types for AI backend adapters.
//!
//! This crate provides the shared interface consumed by the call
//! orchestrator and implemented by every backend adapter. It defines:
//!
//! - [`Backend`] - The trait all backend adapters implement
//! - [`GenerateRequest`] - Input for a single reply generation
//! - [`BackendError`] - Error taxonomy shared by all adapters
//! - [`Turn`] / [`Role`] - Conversation turn types
//! - [`ConversationHistory`] - Bounded per-call turn log
//!
//! # Example
//!
//! ```rust
//! use backend_core::{Backend, BackendError, GenerateRequest};
//! use async_trait::async_trait;
//!
//! struct MyBackend;
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
//!         Ok(format!("You said: {}", request.utterance))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "my-backend"
//!     }
//! }
//! ```

mod error;
mod history;
mod prompt;
mod trait_def;
mod turn;

pub use error::BackendError;
pub use history::{ConversationHistory, DEFAULT_MAX_TURNS};
pub use prompt::{build_system_prompt, hash_prompt, DEFAULT_SYSTEM_PROMPT};
pub use trait_def::{Backend, GenerateRequest};
pub use turn::{Role, Turn};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
