//! Telephony-facing event and action types.
//!
//! The telephony integration feeds [`CallEvent`]s in and executes the
//! [`SessionAction`] that comes back. Both serialize, so a bridge
//! process can ship them over a socket.

use serde::{Deserialize, Serialize};

/// An event arriving from the telephony layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallEvent {
    /// A new inbound call is ringing.
    CallStarted { call_id: String, caller_id: String },
    /// Transcribed caller speech.
    Utterance { call_id: String, text: String },
    /// The call ended (caller hung up, carrier dropped, etc.).
    CallEnded { call_id: String, reason: String },
}

impl CallEvent {
    /// The call this event belongs to.
    pub fn call_id(&self) -> &str {
        match self {
            CallEvent::CallStarted { call_id, .. }
            | CallEvent::Utterance { call_id, .. }
            | CallEvent::CallEnded { call_id, .. } => call_id,
        }
    }
}

/// What the telephony layer should do after speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    /// Keep the line open and stream the next utterance.
    GatherSpeech,
    /// Terminate the call.
    Hangup,
}

/// Instruction returned to the telephony layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAction {
    /// Text to speak to the caller. Empty means nothing to say.
    pub say: String,
    /// What to do once the text has been spoken.
    pub next: NextStep,
}

impl SessionAction {
    /// Speak and keep listening.
    pub fn say_and_listen(say: impl Into<String>) -> Self {
        Self {
            say: say.into(),
            next: NextStep::GatherSpeech,
        }
    }

    /// Speak a farewell and terminate.
    pub fn say_and_hangup(say: impl Into<String>) -> Self {
        Self {
            say: say.into(),
            next: NextStep::Hangup,
        }
    }

    /// Terminate without speaking.
    pub fn hangup() -> Self {
        Self {
            say: String::new(),
            next: NextStep::Hangup,
        }
    }
}
