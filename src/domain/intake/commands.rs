//! Whole-message commands: reset words, greetings and yes/no replies.
//!
//! All matching is case-insensitive against the trimmed message with
//! trailing punctuation removed, so "Yes!" and " RESET " both count.

const RESET_WORDS: &[&str] = &["reset", "restart", "quit", "q", "exit"];

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hii",
    "good morning",
    "good afternoon",
    "good evening",
    "start",
    "help",
];

const AFFIRM_WORDS: &[&str] = &["yes", "y", "confirm", "ok", "okay", "sure", "correct", "submit"];

const DECLINE_WORDS: &[&str] = &["no", "n", "cancel", "discard", "wrong"];

/// Lowercases, trims and drops trailing punctuation.
pub(crate) fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim()
        .to_lowercase()
}

/// True when the whole message is a reset command.
pub fn is_reset_command(text: &str) -> bool {
    RESET_WORDS.contains(&normalize(text).as_str())
}

/// True when the whole message is a greeting and nothing else.
pub fn is_greeting(text: &str) -> bool {
    GREETINGS.contains(&normalize(text).as_str())
}

/// A reply to the confirmation question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Affirm,
    Decline,
}

impl Confirmation {
    /// Reads a yes/no reply; anything else is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = normalize(text);
        if AFFIRM_WORDS.contains(&normalized.as_str()) {
            Some(Self::Affirm)
        } else if DECLINE_WORDS.contains(&normalized.as_str()) {
            Some(Self::Decline)
        } else {
            None
        }
    }
}
