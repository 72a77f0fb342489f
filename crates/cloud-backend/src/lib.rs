//! Hosted high-capability model adapter.
//!
//! Implements [`backend_core::Backend`] over an Anthropic-style
//! messages API. Used by the router as the escalation target for
//! complex utterances and as the fallback when the local backend
//! fails.

mod api_types;
mod backend;
mod config;

pub use backend::{CloudBackend, BACKEND_NAME};
pub use config::{CloudBackendConfig, CloudBackendConfigBuilder};
