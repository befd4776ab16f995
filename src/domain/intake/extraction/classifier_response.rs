//! Parsing of free-text classifier output.
//!
//! Models are asked for a bare JSON object but routinely wrap it in a code
//! fence or a sentence of prose. The parser digs the object out, then keeps
//! only string values for known field keys.

use super::ExtractionError;
use crate::domain::intake::{FieldDelta, FieldName};

/// Maximum accepted classifier response length (16KB).
pub const MAX_RESPONSE_LENGTH: usize = 16_000;

/// Maximum length kept for a single field value, in characters.
pub const MAX_FIELD_LENGTH: usize = 500;

/// Values models use to say "not found".
const PLACEHOLDERS: &[&str] = &["null", "none", "n/a", "na", "unknown", "not provided", "-"];

/// Turns a raw classifier response into a validated delta.
///
/// Unknown keys and non-string or placeholder values are skipped. A response
/// that contains no JSON object at all is an error.
pub fn parse_classifier_response(response: &str) -> Result<FieldDelta, ExtractionError> {
    if response.len() > MAX_RESPONSE_LENGTH {
        return Err(ExtractionError::InvalidResponse(format!(
            "{} bytes exceeds maximum of {} bytes",
            response.len(),
            MAX_RESPONSE_LENGTH
        )));
    }

    let cleaned: String = response
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect();

    let json = extract_json_object(&cleaned)
        .ok_or_else(|| ExtractionError::InvalidResponse("no JSON object found".to_string()))?;

    let value: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| ExtractionError::Parse(e.to_string()))?;

    let serde_json::Value::Object(object) = value else {
        return Err(ExtractionError::InvalidResponse("expected a JSON object".to_string()));
    };

    let mut delta = FieldDelta::new();
    for (key, value) in object {
        let Ok(field) = key.parse::<FieldName>() else {
            continue;
        };
        let Some(text) = value.as_str() else {
            continue;
        };
        let text = text.trim();
        if PLACEHOLDERS.contains(&text.to_lowercase().as_str()) {
            continue;
        }
        delta.insert(field, truncate(text));
    }
    Ok(delta)
}

fn truncate(value: &str) -> String {
    value.chars().take(MAX_FIELD_LENGTH).collect()
}

/// Finds the JSON object in a response that may carry fences or prose.
fn extract_json_object(response: &str) -> Option<String> {
    let trimmed = response.trim();

    if let Some(block) = extract_from_code_block(trimmed) {
        return Some(block);
    }

    let start = trimmed.find('{')?;
    extract_balanced_object(trimmed, start)
}

fn extract_from_code_block(s: &str) -> Option<String> {
    let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = s.find(pattern) {
            let body_start = start + pattern.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim().to_string());
            }
        }
    }
    None
}

fn extract_balanced_object(s: &str, start: usize) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(s[start..start + offset + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}
