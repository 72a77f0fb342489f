//! Bounded conversation history for a single call.
//!
//! Each call session owns exactly one history. Appending past the cap
//! evicts the oldest non-pinned turns first; an optional pinned system
//! turn at index 0 survives eviction.

use crate::turn::{Role, Turn};

/// Default maximum number of turns retained per call.
pub const DEFAULT_MAX_TURNS: usize = 50;

/// Ordered, bounded log of turns for one call.
///
/// Invariant: `len() <= cap` at all times. Once any turn has been
/// evicted, `was_trimmed()` stays true so summaries can disclose the
/// missing context.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
    max_turns: usize,
    pinned: bool,
    trimmed: bool,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

impl ConversationHistory {
    /// Create a history bounded to `max_turns` entries.
    ///
    /// A cap of zero is treated as one so an appended turn is never
    /// immediately dropped.
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: max_turns.max(1),
            pinned: false,
            trimmed: false,
        }
    }

    /// Pin a system turn at index 0.
    ///
    /// The pinned turn survives eviction. Calling again replaces the
    /// previous pinned turn.
    pub fn pin_system(&mut self, text: impl Into<String>) {
        let turn = Turn::system(text);
        if self.pinned {
            self.turns[0] = turn;
        } else {
            self.turns.insert(0, turn);
            self.pinned = true;
            self.evict();
        }
    }

    /// Append a turn, evicting the oldest non-pinned turns if the cap
    /// would be exceeded.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.evict();
    }

    fn evict(&mut self) {
        let floor = usize::from(self.pinned);
        while self.turns.len() > self.max_turns && self.turns.len() > floor {
            self.turns.remove(floor);
            self.trimmed = true;
        }
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// All retained turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of retained turns, including any pinned turn.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns have been appended.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Whether any turn has ever been evicted.
    pub fn was_trimmed(&self) -> bool {
        self.trimmed
    }

    /// Condense the retained history into a short note.
    ///
    /// This is the rule-based fallback used when no backend is
    /// available to summarize the call. If turns were evicted, the
    /// note says so rather than claiming completeness.
    pub fn summarize(&self) -> String {
        if self.turns.is_empty() {
            return "No conversation history.".to_string();
        }

        let caller_turns = self.turns.iter().filter(|t| t.role == Role::Caller).count();
        let assistant_turns = self
            .turns
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .count();

        let mut summary = format!(
            "Call with {} caller and {} assistant turns.",
            caller_turns, assistant_turns
        );

        if let Some(first) = self.turns.iter().find(|t| t.role == Role::Caller) {
            summary.push_str(&format!(" Opened with: \"{}\".", truncate(&first.text, 80)));
        }
        if let Some(last) = self.turns.iter().rev().find(|t| t.role == Role::Assistant) {
            summary.push_str(&format!(" Last reply: \"{}\".", truncate(&last.text, 80)));
        }

        if self.trimmed {
            summary.push_str(" Earlier context was trimmed from this call.");
        }

        summary
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
