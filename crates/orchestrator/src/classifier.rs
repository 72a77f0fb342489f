//! Utterance complexity classification.
//!
//! The classifier is a pluggable strategy so a learned model can
//! replace the lexical rules without touching the router.

use regex::Regex;
use serde::Serialize;

/// Complexity tier of one utterance.
///
/// Ordered so that ambiguity can escalate: when rules disagree, the
/// higher tier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Greetings, yes/no, short pleasantries.
    Simple,
    /// Status checks, scheduling, basic business questions.
    Moderate,
    /// Multi-clause, reasoning-seeking, or open-ended queries.
    Complex,
}

impl Tier {
    /// Abstract model tier hint carried to backend adapters.
    pub fn model_hint(self) -> &'static str {
        match self {
            Tier::Simple => "fast",
            Tier::Moderate => "chat",
            Tier::Complex => "smart",
        }
    }
}

/// Strategy for classifying utterances.
///
/// Implementations must be total: classification never fails.
pub trait Classifier: Send + Sync {
    /// Classify an utterance into a complexity tier.
    fn classify(&self, utterance: &str) -> Tier;

    /// Whether the utterance is about appointments or scheduling.
    ///
    /// Appointment queries stay on the conversational model tier for
    /// reliable structured handling. Default: never.
    fn is_appointment(&self, _utterance: &str) -> bool {
        false
    }
}

/// Lexical rule-based classifier.
///
/// Rule precedence: complex patterns first, then moderate, then
/// simple, then word-count heuristics; the default is Moderate.
/// Short utterances are checked against the simple rules before
/// anything else so "hi" never escalates.
pub struct PatternClassifier {
    simple: Vec<Regex>,
    moderate: Vec<Regex>,
    complex: Vec<Regex>,
    appointment_keywords: &'static [&'static str],
}

const SIMPLE_PATTERNS: &[&str] = &[
    r"^(hi|hello|hey|good\s*(morning|afternoon|evening)|greetings)\b",
    r"^(yes|no|yeah|nope|sure|ok|okay|yep|nah)\b",
    r"^(thanks|thank\s*you|bye|goodbye|see\s*you)\b",
    r"^(what|who)\s*(is|are)\s*(your|the)\s*name",
    r"^how\s*are\s*you",
];

const MODERATE_PATTERNS: &[&str] = &[
    r"\b(status|update|check)\s*(on|for|of)\b",
    r"\bis\s*(my|the|it)\s*\w+\s*ready\b",
    r"\b(when|what\s*time|how\s*long)\b",
    r"\b(schedule|book|appointment|available)\b",
    r"\b(price|cost|how\s*much)\b",
    r"\b(hours|open|close|location|address)\b",
];

const COMPLEX_PATTERNS: &[&str] = &[
    r"\b(explain|describe|tell\s*me\s*(about|more)|elaborate)\b",
    r"\b(why|how\s*does|how\s*do\s*i|what\s*should\s*i)\b",
    r"\b(compare|difference|between|versus|vs)\b",
    r"\b(recommend|suggest|advice|opinion)\b",
    r"\b(problem|issue|trouble|not\s*working|broken)\b",
    r"\b(multiple|several|many|list|all)\b",
    r"\b(if|because|however|although)\b",
];

const APPOINTMENT_KEYWORDS: &[&str] = &[
    "appointment",
    "schedule",
    "book",
    "reserve",
    "cancel",
    "reschedule",
    "available",
    "slot",
    "calendar",
];

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternClassifier {
    /// Create a classifier with the built-in rule sets.
    pub fn new() -> Self {
        Self {
            simple: compile(SIMPLE_PATTERNS),
            moderate: compile(MODERATE_PATTERNS),
            complex: compile(COMPLEX_PATTERNS),
            appointment_keywords: APPOINTMENT_KEYWORDS,
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static classifier pattern compiles"))
        .collect()
}

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

impl Classifier for PatternClassifier {
    fn classify(&self, utterance: &str) -> Tier {
        let text = utterance.trim().to_lowercase();
        if text.is_empty() {
            return Tier::Simple;
        }

        let word_count = text.split_whitespace().count();

        // Very short utterances matching a greeting/ack form are simple.
        if word_count <= 3 && matches_any(&self.simple, &text) {
            return Tier::Simple;
        }

        // Higher tiers take precedence; ambiguity escalates.
        if matches_any(&self.complex, &text) {
            return Tier::Complex;
        }
        if matches_any(&self.moderate, &text) {
            return Tier::Moderate;
        }
        if matches_any(&self.simple, &text) {
            return Tier::Simple;
        }

        // Long utterances tend to be more complex.
        if word_count > 15 {
            Tier::Complex
        } else {
            Tier::Moderate
        }
    }

    fn is_appointment(&self, utterance: &str) -> bool {
        let text = utterance.to_lowercase();
        self.appointment_keywords.iter().any(|k| text.contains(k))
    }
}
