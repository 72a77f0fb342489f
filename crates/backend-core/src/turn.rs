//! Conversation turn types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Transcribed caller speech.
    Caller,
    /// A generated assistant reply.
    Assistant,
    /// A pinned note or context marker.
    System,
}

/// One entry in a call's conversation history.
///
/// Turns are immutable once appended. For assistant turns, `backend`
/// names the backend that produced the reply; `None` on an assistant
/// turn marks a reply generated after total backend exhaustion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,
    /// The spoken or generated text.
    pub text: String,
    /// When the turn was appended.
    pub timestamp: DateTime<Utc>,
    /// Backend that produced an assistant turn, if any.
    pub backend: Option<String>,
}

impl Turn {
    /// Create a caller turn.
    pub fn caller(text: impl Into<String>) -> Self {
        Self {
            role: Role::Caller,
            text: text.into(),
            timestamp: Utc::now(),
            backend: None,
        }
    }

    /// Create an assistant turn with no backend attribution.
    ///
    /// Used when every backend in the preference list failed and the
    /// reply is the generic failure response.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
            backend: None,
        }
    }

    /// Create an assistant turn attributed to a backend.
    pub fn assistant_via(text: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
            backend: Some(backend.into()),
        }
    }

    /// Create a system turn.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
            timestamp: Utc::now(),
            backend: None,
        }
    }

    /// Whether this turn came from the caller.
    pub fn is_caller(&self) -> bool {
        self.role == Role::Caller
    }

    /// Whether this turn is an assistant reply.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
