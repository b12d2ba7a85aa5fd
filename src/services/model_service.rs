use crate::models::{ComplexityTier, ModelSelection};
use crate::utils::word_count;

const SIMPLE_PHRASES: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "thanks",
    "thank you",
    "ok",
    "okay",
    "yes",
    "no",
    "sure",
    "great",
    "awesome",
    "cool",
    "got it",
];

const COMPLEX_MARKERS: &[&str] = &[
    "integrate",
    "api",
    "technical",
    "architecture",
    "how exactly",
    "explain in detail",
    "step by step",
    "compare",
    "difference between",
    "custom",
    "specific",
    "enterprise",
    "compliance",
    "gdpr",
    "soc",
    "multiple",
    "several",
    "and also",
    "also want",
    "in addition",
];

const SIMPLE_MAX_WORDS: usize = 4;
const COMPLEX_MIN_WORDS: usize = 26;
const COMPLEX_MIN_HISTORY: usize = 9;

/// Buckets a message into a tier. First matching rule wins: simple, then
/// complex, then medium.
///
/// Markers are plain substring checks, so "soc" also fires on words such as
/// "social".
pub fn classify(message: &str, history_len: usize) -> ComplexityTier {
    let normalized = message.trim().to_lowercase();
    let words = word_count(message);

    let is_simple_phrase = SIMPLE_PHRASES.iter().any(|phrase| {
        normalized == *phrase
            || normalized
                .strip_prefix(phrase)
                .is_some_and(|rest| rest.starts_with(' '))
    });
    if is_simple_phrase || words <= SIMPLE_MAX_WORDS {
        return ComplexityTier::Simple;
    }

    let has_marker = COMPLEX_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker));
    if has_marker || words >= COMPLEX_MIN_WORDS || history_len >= COMPLEX_MIN_HISTORY {
        return ComplexityTier::Complex;
    }

    ComplexityTier::Medium
}

#[derive(Debug, Clone, Default)]
pub struct ModelService {
    selection: ModelSelection,
}

impl ModelService {
    pub fn new(selection: ModelSelection) -> Self {
        Self { selection }
    }

    /// Classifies the message and returns the tier with its model.
    pub fn select(&self, message: &str, history_len: usize) -> (ComplexityTier, &str) {
        let tier = classify(message, history_len);
        (tier, self.selection.model_for(tier))
    }
}
