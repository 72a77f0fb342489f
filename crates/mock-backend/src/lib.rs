//! Mock backend implementations for testing call orchestration.
//!
//! Provides three test doubles for the [`backend_core::Backend`] trait:
//!
//! - [`ScriptedBackend`] - fixed reply, records every request
//! - [`FailingBackend`] - always fails with a configured error
//! - [`DelayedBackend`] - wraps another backend with artificial delay

mod delayed;
mod failing;
mod scripted;

pub use delayed::DelayedBackend;
pub use failing::FailingBackend;
pub use scripted::ScriptedBackend;
