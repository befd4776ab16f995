//! Field extraction from free-form message text.
//!
//! A [`PatternExtractor`] runs an ordered list of [`FieldMatcher`]s over one
//! [`ExtractionPass`]. Earlier matchers win: anchored phrases ("my name is",
//! "phone:") run first, bare structural patterns second, whole-message
//! fallbacks third, and the issue description last on whatever text the
//! other matchers left unclaimed.
//!
//! The extractor is pure. Merging into a session record happens elsewhere
//! through [`FieldRecord::merge`](super::FieldRecord::merge).

mod classifier_response;
mod matchers;

use std::ops::Range;
use thiserror::Error;

use super::{FieldDelta, FieldName, FieldRecord};

pub use classifier_response::{parse_classifier_response, MAX_FIELD_LENGTH, MAX_RESPONSE_LENGTH};
pub use matchers::{
    FallbackNameMatcher, FallbackReferenceMatcher, IssueMatcher, LabeledDateMatcher,
    LabeledNameMatcher, LabeledPhoneMatcher, LabeledReferenceMatcher, StructuralDateMatcher,
    StructuralPhoneMatcher, StructuralReferenceMatcher,
};

/// Errors from the free-text classifier path.
///
/// None of these are fatal; callers treat every variant as "no fields found".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier output parse error: {0}")]
    Parse(String),

    #[error("Invalid classifier response: {0}")]
    InvalidResponse(String),
}

/// One step of the extraction chain.
pub trait FieldMatcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Looks for evidence in `pass` and claims whatever it finds.
    fn attempt(&self, pass: &mut ExtractionPass<'_>);
}

/// Working state for extracting fields from a single message.
#[derive(Debug)]
pub struct ExtractionPass<'a> {
    text: &'a str,
    known: &'a FieldRecord,
    found: FieldDelta,
    consumed: Vec<Range<usize>>,
    matched: bool,
}

impl<'a> ExtractionPass<'a> {
    pub fn new(text: &'a str, known: &'a FieldRecord) -> Self {
        Self {
            text,
            known,
            found: FieldDelta::new(),
            consumed: Vec::new(),
            matched: false,
        }
    }

    /// The raw message text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// True when `field` is neither known from earlier turns nor found yet.
    pub fn needs(&self, field: FieldName) -> bool {
        !self.known.is_filled(field) && !self.found.contains(field)
    }

    /// Fields that are still open after the matchers run so far.
    pub fn open_fields(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|field| self.needs(*field))
            .collect()
    }

    /// Marks `span` as belonging to `field` and records `value` if the field
    /// is still needed.
    ///
    /// The span is consumed even when the field is already known so that a
    /// repeated phone number never leaks into the issue text. Returns whether
    /// the value was recorded.
    pub fn claim(&mut self, field: FieldName, value: &str, span: Range<usize>) -> bool {
        self.matched = true;
        self.consumed.push(span);
        self.needs(field) && self.found.insert(field, value)
    }

    /// Records a value that has no single span in the message.
    pub fn claim_leftover(&mut self, field: FieldName, value: &str) -> bool {
        if !self.needs(field) {
            return false;
        }
        let inserted = self.found.insert(field, value);
        self.matched |= inserted;
        inserted
    }

    /// True when `span` overlaps any span already claimed.
    pub fn is_consumed(&self, span: &Range<usize>) -> bool {
        self.consumed
            .iter()
            .any(|taken| taken.start < span.end && span.start < taken.end)
    }

    /// True when any matcher recognised any field, known or new.
    pub fn matched_anything(&self) -> bool {
        self.matched
    }

    /// The message with every claimed span removed.
    ///
    /// Whitespace is collapsed and punctuation left dangling by the removal
    /// is dropped.
    pub fn leftover(&self) -> String {
        let mut spans = self.consumed.clone();
        spans.sort_by_key(|span| span.start);

        let mut kept = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for span in spans {
            if span.start > cursor {
                kept.push_str(&self.text[cursor..span.start]);
                kept.push(' ');
            }
            cursor = cursor.max(span.end);
        }
        if cursor < self.text.len() {
            kept.push_str(&self.text[cursor..]);
        }

        kept.split_whitespace()
            .filter(|token| token.chars().any(char::is_alphanumeric))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn into_delta(self) -> FieldDelta {
        self.found
    }
}

/// Deterministic extractor composed of ordered matchers.
pub struct PatternExtractor {
    matchers: Vec<Box<dyn FieldMatcher>>,
}

impl PatternExtractor {
    /// Builds an extractor from an explicit matcher chain.
    pub fn with_matchers(matchers: Vec<Box<dyn FieldMatcher>>) -> Self {
        Self { matchers }
    }

    /// Finds field values in `text` that `known` does not already hold.
    pub fn extract(&self, text: &str, known: &FieldRecord) -> FieldDelta {
        let mut pass = ExtractionPass::new(text, known);
        for matcher in &self.matchers {
            matcher.attempt(&mut pass);
        }
        let delta = pass.into_delta();
        tracing::trace!(fields = delta.len(), "pattern extraction finished");
        delta
    }

    /// Names of the matchers in evaluation order.
    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::with_matchers(vec![
            Box::new(LabeledNameMatcher),
            Box::new(LabeledPhoneMatcher),
            Box::new(LabeledDateMatcher),
            Box::new(LabeledReferenceMatcher),
            Box::new(StructuralPhoneMatcher),
            Box::new(StructuralDateMatcher),
            Box::new(StructuralReferenceMatcher),
            Box::new(FallbackNameMatcher),
            Box::new(FallbackReferenceMatcher),
            Box::new(IssueMatcher),
        ])
    }
}

impl std::fmt::Debug for PatternExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternExtractor")
            .field("matchers", &self.matcher_names())
            .finish()
    }
}
