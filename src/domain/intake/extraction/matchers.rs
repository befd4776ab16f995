//! The individual matchers of the default extraction chain.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::{ExtractionPass, FieldMatcher};
use crate::domain::intake::commands::{is_greeting, is_reset_command, Confirmation};
use crate::domain::intake::FieldName;

const ISSUE_KEYWORDS: &[&str] = &["issue", "problem", "not working", "error"];

/// Words that cannot open a name after a lead-in ("i am facing...").
const NAME_REJECT_FIRST: &[&str] = &[
    "a", "an", "the", "not", "unable", "facing", "having", "getting", "trying", "looking",
    "writing", "calling", "reaching", "regarding", "about", "from", "with", "in", "at", "on",
    "to", "my", "your", "very", "so", "still", "also", "just", "here", "sorry", "waiting",
    "going", "interested", "fine", "good", "ok", "okay", "sure", "done", "issue", "problem",
    "error", "urgent", "really", "related", "for", "because", "happening", "taking",
];

/// Words that end a name once it has started.
const NAME_STOP_WORDS: &[&str] = &[
    "and", "my", "phone", "mobile", "number", "contact", "from", "with", "ref", "reference",
    "date", "dated", "issue", "problem", "i", "is", "am", "here", "please", "calling", "at",
    "on", "the", "regarding", "about", "for", "to", "having", "facing", "but", "also", "since",
    "ticket", "id",
];

/// Words that rule out a bare message being a name.
const FALLBACK_NAME_BLOCKLIST: &[&str] = &[
    "ok", "okay", "yes", "no", "thanks", "thank", "you", "please", "hello", "hi", "hey", "good",
    "morning", "evening", "afternoon", "night", "sure", "what", "why", "how", "when", "where",
    "who", "can", "could", "would", "want", "need", "help", "not", "working", "wrong", "done",
    "reset", "start", "stop", "cancel", "refund", "order", "payment", "service",
];

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

static NAME_LEAD_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:my\s+)?name\s+is\s+|i\s+am\s+|i'm\s+|this\s+is\s+|name\s*[:\-]\s*)([a-z][a-z.' ]*)",
    )
    .expect("name lead-in regex")
});

static NAME_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z.']*").expect("name word regex"));

static BARE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z.' ]*$").expect("bare name regex"));

static PHONE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:phone|mobile|mob|cell|contact|whatsapp|ph)(?:\s*(?:no|number|num|#))?\.?\s*(?:is\s*|:\s*|-\s*)?(\+?\d(?:[\s-]?\d){9,14})\b",
    )
    .expect("phone label regex")
});

static BARE_PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\b(\d{10,15})\b").expect("bare phone regex"));

static DATE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:date\s+of\s+issue|issue\s+date|date|dated)\b\s*(?:is\s+|:\s*|-\s*|on\s+)?")
        .expect("date label regex")
});

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})\b").expect("numeric date regex")
});

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date regex"));

static DAY_MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]{3,9})\.?,?\s+(\d{4})\b")
        .expect("day month-name regex")
});

static MONTH_NAME_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
        .expect("month-name day regex")
});

static REFERENCE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:reference|ref|ticket|complaint|order)\b(?:\s*(?:id|no|number|num|#))?\.?\s*(?:is\s*|:\s*|-\s*|#\s*)?([a-z0-9][a-z0-9\-/]{2,24})",
    )
    .expect("reference label regex")
});

static BARE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z0-9]{4,20}\b").expect("token regex"));

static NOT_A_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d+(?:st|nd|rd|th|am|pm|hr|hrs|min|mins|days|kg|gb|mb)$").expect("unit regex")
});

static SINGLE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-/#_]{3,29}$").expect("single token regex")
});

static ISSUE_LEAD_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)\b(?:(?:my|the)\s+issue\s+is|issue\s+is|issue\s*[:\-]|(?:my\s+)?problem\s+is|problem\s*[:\-]|complaint\s*[:\-]|(?:i\s+am|i'm|im)\s+facing(?:\s+an?)?(?:\s+(?:issue|problem))?(?:\s+(?:with|of|that|regarding))?|facing\s+(?:an?\s+)?(?:issue|problem)(?:\s+(?:with|of|regarding))?)\s*(.*)$",
    )
    .expect("issue lead-in regex")
});

fn has_issue_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    ISSUE_KEYWORDS.iter().any(|keyword| {
        lower
            .match_indices(keyword)
            .any(|(at, _)| is_word_boundary(&lower, at, at + keyword.len()))
    })
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Collects name words from a lead-in capture.
///
/// Returns the name and its byte length inside `capture`, or `None` when the
/// first word shows the lead-in was not introducing a name.
fn take_name_words(capture: &str) -> Option<(String, usize)> {
    let mut words = Vec::new();
    let mut end = 0;
    for word in NAME_WORD.find_iter(capture) {
        let lower = word.as_str().trim_end_matches('.').to_lowercase();
        if words.is_empty() && NAME_REJECT_FIRST.contains(&lower.as_str()) {
            return None;
        }
        if words.len() == 5 || NAME_STOP_WORDS.contains(&lower.as_str()) {
            break;
        }
        words.push(word.as_str());
        end = word.end();
    }
    if words.is_empty() {
        return None;
    }
    let name = words.join(" ").trim_end_matches('.').to_string();
    Some((name, end))
}

fn phone_digits(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (10..=15).contains(&digits.len()).then_some(digits)
}

fn month_number(word: &str) -> Option<u32> {
    let word = word.to_lowercase();
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(word.as_str()))
        .map(|index| index as u32 + 1)
}

fn normalized_date(day: &str, month: u32, year: &str) -> Option<String> {
    let day: u32 = day.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if !(1900..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.format("%d-%m-%Y").to_string())
}

/// Every valid date in `text` with its span, ordered by position.
fn date_candidates(text: &str) -> Vec<(Range<usize>, String)> {
    let mut found = Vec::new();

    for caps in NUMERIC_DATE.captures_iter(text) {
        let (Some(whole), Ok(month)) = (caps.get(0), caps[2].parse::<u32>()) else {
            continue;
        };
        if let Some(value) = normalized_date(&caps[1], month, &caps[3]) {
            found.push((whole.range(), value));
        }
    }

    for caps in ISO_DATE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if NaiveDate::parse_from_str(whole.as_str(), "%Y-%m-%d").is_ok() {
            found.push((whole.range(), whole.as_str().to_string()));
        }
    }

    for caps in DAY_MONTH_NAME.captures_iter(text) {
        let (Some(whole), Some(month)) = (caps.get(0), month_number(&caps[2])) else {
            continue;
        };
        if let Some(value) = normalized_date(&caps[1], month, &caps[3]) {
            found.push((whole.range(), value));
        }
    }

    for caps in MONTH_NAME_DAY.captures_iter(text) {
        let (Some(whole), Some(month)) = (caps.get(0), month_number(&caps[1])) else {
            continue;
        };
        if let Some(value) = normalized_date(&caps[2], month, &caps[3]) {
            found.push((whole.range(), value));
        }
    }

    found.sort_by_key(|(span, _)| span.start);
    found
}

fn reference_value(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
    let valid = (4..=20).contains(&cleaned.len()) && cleaned.chars().any(|c| c.is_ascii_digit());
    valid.then_some(cleaned)
}

fn clean_issue(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ';' | ':' | '-'));
    let useful = trimmed.chars().count() >= 2 && trimmed.chars().any(char::is_alphabetic);
    useful.then(|| trimmed.to_string())
}

/// "my name is ...", "i am ...", "this is ...", "name: ...".
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledNameMatcher;

impl FieldMatcher for LabeledNameMatcher {
    fn name(&self) -> &'static str {
        "labeled_name"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        let text = pass.text();
        for caps in NAME_LEAD_IN.captures_iter(text) {
            let (Some(whole), Some(capture)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some((name, len)) = take_name_words(capture.as_str()) {
                pass.claim(FieldName::Name, &name, whole.start()..capture.start() + len);
                return;
            }
        }
    }
}

/// "phone: ...", "mobile number is ...".
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledPhoneMatcher;

impl FieldMatcher for LabeledPhoneMatcher {
    fn name(&self) -> &'static str {
        "labeled_phone"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        let text = pass.text();
        for caps in PHONE_LABEL.captures_iter(text) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(digits) = phone_digits(number.as_str()) {
                pass.claim(FieldName::Phone, &digits, whole.range());
                return;
            }
        }
    }
}

/// "date: ...", "date of issue is ...".
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledDateMatcher;

impl FieldMatcher for LabeledDateMatcher {
    fn name(&self) -> &'static str {
        "labeled_date"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        let text = pass.text();
        let candidates = date_candidates(text);
        for label in DATE_LABEL.find_iter(text) {
            let anchored = candidates.iter().find(|(span, _)| span.start == label.end());
            if let Some((span, value)) = anchored {
                pass.claim(FieldName::DateOfIssue, value, label.start()..span.end);
                return;
            }
        }
    }
}

/// "reference id: ...", "ref no. ...", "ticket #...".
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledReferenceMatcher;

impl FieldMatcher for LabeledReferenceMatcher {
    fn name(&self) -> &'static str {
        "labeled_reference"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        let text = pass.text();
        for caps in REFERENCE_LABEL.captures_iter(text) {
            let (Some(whole), Some(raw)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if pass.is_consumed(&whole.range()) {
                continue;
            }
            if let Some(value) = reference_value(raw.as_str()) {
                pass.claim(FieldName::ReferenceId, &value, whole.range());
                return;
            }
        }
    }
}

/// A standalone run of 10-15 digits, optionally prefixed with `+`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralPhoneMatcher;

impl FieldMatcher for StructuralPhoneMatcher {
    fn name(&self) -> &'static str {
        "structural_phone"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        let text = pass.text();
        for caps in BARE_PHONE.captures_iter(text) {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !pass.is_consumed(&whole.range()) {
                pass.claim(FieldName::Phone, digits.as_str(), whole.range());
                return;
            }
        }
    }
}

/// The first valid calendar date anywhere in the message.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralDateMatcher;

impl FieldMatcher for StructuralDateMatcher {
    fn name(&self) -> &'static str {
        "structural_date"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        let candidates = date_candidates(pass.text());
        if let Some((span, value)) = candidates.into_iter().find(|(span, _)| !pass.is_consumed(span)) {
            pass.claim(FieldName::DateOfIssue, &value, span);
        }
    }
}

/// An unclaimed alphanumeric token mixing letters and digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralReferenceMatcher;

impl FieldMatcher for StructuralReferenceMatcher {
    fn name(&self) -> &'static str {
        "structural_reference"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        let text = pass.text();
        for token in BARE_TOKEN.find_iter(text) {
            let value = token.as_str();
            let mixed = value.chars().any(|c| c.is_ascii_digit()) && value.chars().any(|c| c.is_ascii_alphabetic());
            if !mixed || NOT_A_REFERENCE.is_match(value) || pass.is_consumed(&token.range()) {
                continue;
            }
            pass.claim(FieldName::ReferenceId, value, token.range());
            return;
        }
    }
}

/// A bare message of 2-5 plain words is taken as the name.
///
/// Only fires when nothing else in the message was recognised.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackNameMatcher;

impl FieldMatcher for FallbackNameMatcher {
    fn name(&self) -> &'static str {
        "fallback_name"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        if !pass.needs(FieldName::Name) || pass.matched_anything() {
            return;
        }
        let text = pass.text();
        if is_greeting(text) || is_reset_command(text) || Confirmation::parse(text).is_some() {
            return;
        }
        let candidate = text.trim().trim_end_matches(['.', '!']).trim();
        if !BARE_NAME.is_match(candidate) || has_issue_keyword(candidate) {
            return;
        }
        let words: Vec<&str> = candidate.split_whitespace().collect();
        if !(2..=5).contains(&words.len()) {
            return;
        }
        let blocked = words.iter().any(|word| {
            let lower = word.to_lowercase();
            FALLBACK_NAME_BLOCKLIST.contains(&lower.as_str()) || NAME_STOP_WORDS.contains(&lower.as_str())
        });
        if !blocked {
            pass.claim(FieldName::Name, &words.join(" "), 0..text.len());
        }
    }
}

/// A message that is a single code-like token with a digit is the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackReferenceMatcher;

impl FieldMatcher for FallbackReferenceMatcher {
    fn name(&self) -> &'static str {
        "fallback_reference"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        if !pass.needs(FieldName::ReferenceId) || pass.matched_anything() {
            return;
        }
        let text = pass.text();
        let candidate = text.trim();
        if !SINGLE_TOKEN.is_match(candidate) {
            return;
        }
        if let Some(value) = reference_value(candidate) {
            pass.claim(FieldName::ReferenceId, &value, 0..text.len());
        }
    }
}

/// Issue description from the text no other matcher claimed.
///
/// Taken when a lead-in anchors it, when the leftover carries an issue
/// keyword, or when the issue is the only field still open.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueMatcher;

impl FieldMatcher for IssueMatcher {
    fn name(&self) -> &'static str {
        "issue"
    }

    fn attempt(&self, pass: &mut ExtractionPass<'_>) {
        if !pass.needs(FieldName::IssueDescription) {
            return;
        }
        let leftover = pass.leftover();
        if leftover.is_empty() {
            return;
        }

        if let Some(caps) = ISSUE_LEAD_IN.captures(&leftover) {
            if let Some(issue) = caps.get(1).and_then(|m| clean_issue(m.as_str())) {
                pass.claim_leftover(FieldName::IssueDescription, &issue);
            }
            return;
        }

        let Some(issue) = clean_issue(&leftover) else {
            return;
        };
        if has_issue_keyword(&issue) {
            pass.claim_leftover(FieldName::IssueDescription, &issue);
            return;
        }

        let text = pass.text();
        let only_issue_open = pass.open_fields() == [FieldName::IssueDescription];
        let is_command = is_greeting(text) || is_reset_command(text) || Confirmation::parse(text).is_some();
        if only_issue_open && !is_command {
            pass.claim_leftover(FieldName::IssueDescription, &issue);
        }
    }
}
