//! Orchestrator error types.

use backend_core::BackendError;
use thiserror::Error;

use crate::crm::CrmError;
use crate::session::CallState;

/// Errors surfaced while handling call events.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No active session for the call id in the event.
    #[error("no active session for call {0}")]
    SessionNotFound(String),

    /// An event implied a transition the state machine forbids.
    #[error("call {call_id}: invalid transition {from:?} -> {to:?}")]
    SessionStateViolation {
        call_id: String,
        from: CallState,
        to: CallState,
    },

    /// The event was valid but intentionally dropped (duplicate
    /// call-started, reply discarded after hangup).
    #[error("event dropped: {0}")]
    Skipped(String),

    /// A backend error that escaped the router's fallback handling.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The CRM rejected an operation.
    #[error("crm error: {0}")]
    Crm(#[from] CrmError),
}
