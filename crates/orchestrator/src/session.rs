//! Per-call session state.
//!
//! Each call owns a state machine and a bounded conversation history.
//! Transitions are validated here; the orchestrator decides when to
//! attempt them.

use backend_core::ConversationHistory;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::crm::CustomerProfile;
use crate::error::OrchestratorError;

/// Lifecycle state of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// Inbound call, not yet answered.
    Ringing,
    /// Speaking the greeting.
    Greeting,
    /// Waiting for caller speech.
    Listening,
    /// An utterance is being routed to a backend.
    Processing,
    /// Speaking the reply.
    Responding,
    /// Call finished normally.
    Completed,
    /// Call aborted after an unrecoverable error.
    Failed,
}

impl CallState {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Completed | CallState::Failed)
    }
}

fn transition_allowed(from: CallState, to: CallState) -> bool {
    use CallState::*;

    if from.is_terminal() {
        return false;
    }
    // Any live state may end, normally or not.
    if matches!(to, Completed | Failed) {
        return true;
    }
    matches!(
        (from, to),
        (Ringing, Greeting)
            | (Greeting, Listening)
            | (Listening, Processing)
            | (Processing, Responding)
            | (Responding, Listening)
    )
}

/// State for one active call.
#[derive(Debug)]
pub struct CallSession {
    call_id: String,
    caller_id: String,
    state: CallState,
    /// Bounded conversation history for this call.
    pub history: ConversationHistory,
    system_prompt: String,
    customer: Option<CustomerProfile>,
    started_at: DateTime<Utc>,
    interactions: u32,
    duration_secs: Option<i64>,
}

impl CallSession {
    /// Create a session in the Ringing state.
    pub fn new(
        call_id: impl Into<String>,
        caller_id: impl Into<String>,
        history_cap: usize,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            caller_id: caller_id.into(),
            state: CallState::Ringing,
            history: ConversationHistory::new(history_cap),
            system_prompt: String::new(),
            customer: None,
            started_at: Utc::now(),
            interactions: 0,
            duration_secs: None,
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of caller utterances handled on this call.
    pub fn interactions(&self) -> u32 {
        self.interactions
    }

    /// Call duration, set once the session is finalized.
    pub fn duration_secs(&self) -> Option<i64> {
        self.duration_secs
    }

    pub fn customer(&self) -> Option<&CustomerProfile> {
        self.customer.as_ref()
    }

    pub fn set_customer(&mut self, customer: Option<CustomerProfile>) {
        self.customer = customer;
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    /// Attempt a state transition, rejecting anything the lifecycle
    /// forbids. Terminal states are sticky.
    pub fn transition(&mut self, to: CallState) -> Result<(), OrchestratorError> {
        if !transition_allowed(self.state, to) {
            return Err(OrchestratorError::SessionStateViolation {
                call_id: self.call_id.clone(),
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    pub fn record_interaction(&mut self) {
        self.interactions += 1;
    }

    /// Fix the call duration. Idempotent; the first call wins.
    pub fn finalize(&mut self) {
        if self.duration_secs.is_none() {
            self.duration_secs = Some((Utc::now() - self.started_at).num_seconds());
        }
    }
}
