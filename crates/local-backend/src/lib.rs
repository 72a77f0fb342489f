//! Local model-server adapter.
//!
//! Implements [`backend_core::Backend`] over an Ollama-style chat
//! API, with a per-tier model table so the router's complexity hint
//! selects an appropriately sized model. Preferred by the router for
//! simple and moderate utterances.

mod api_types;
mod backend;
mod config;

pub use backend::{LocalBackend, BACKEND_NAME};
pub use config::{LocalBackendConfig, ModelTable};
