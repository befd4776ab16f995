//! Outbound reply texts.
//!
//! WhatsApp renders `*text*` as bold; labels of fields still being asked for
//! are bolded, labels of fields already saved are not.

use super::{CompletedRecord, FieldName};

const CONFIRM_QUESTION: &str = "Reply *yes* to submit or *no* to discard.";
const RESET_HINT: &str = "Send *reset* at any time to start over.";

/// First reply to a bare greeting.
pub fn welcome() -> String {
    let mut text = String::from(
        "Hi 👋, In order to submit details, I will ask a few details. Please provide them correctly.\n\n\
         Please send:\n",
    );
    for field in FieldName::ALL {
        text.push_str(&bullet(field));
    }
    text.push('\n');
    text.push_str(RESET_HINT);
    text
}

/// Asks for the fields still missing, acknowledging what was just saved.
pub fn missing_fields_prompt(captured: &[FieldName], missing: &[FieldName]) -> String {
    let mut text = String::new();
    if !captured.is_empty() {
        let labels: Vec<&str> = captured.iter().map(FieldName::label).collect();
        text.push_str(&format!("Got it ✅ Saved: {}\n\n", labels.join(", ")));
    }
    text.push_str("Please provide:\n");
    for field in missing {
        text.push_str(&bullet(*field));
    }
    text
}

/// Read-back of a complete record followed by the yes/no question.
pub fn confirmation_summary(record: &CompletedRecord) -> String {
    format!(
        "✅ Following details are collected:\n\n\
         *Name*: {}\n\
         *Phone*: {}\n\
         *Date of Issue*: {}\n\
         *Reference ID*: {}\n\
         *Issue*: {}\n\n\
         {}",
        record.name,
        record.phone,
        record.date_of_issue,
        record.reference_id,
        record.issue_description,
        CONFIRM_QUESTION,
    )
}

pub fn confirmation_reprompt() -> String {
    format!("Please confirm the details above. {}", CONFIRM_QUESTION)
}

pub fn submitted() -> String {
    "All details submitted successfully. Thank you! 🎉".to_string()
}

pub fn submission_failed() -> String {
    "❌ Sorry, we could not save your details right now. \
     Reply *yes* to try again or *no* to discard."
        .to_string()
}

pub fn submission_in_progress() -> String {
    "⏳ Your details are being submitted, please wait a moment.".to_string()
}

pub fn discarded() -> String {
    "Your details have been discarded. Send *hi* to start again.".to_string()
}

pub fn reset_acknowledged() -> String {
    "Your session has been reset 🔄. Send *hi* to start again.".to_string()
}

pub fn session_expired() -> String {
    "⌛ Your session expired due to inactivity. Please start over by sending *hi*.".to_string()
}

fn bullet(field: FieldName) -> String {
    match field.hint() {
        Some(hint) => format!("• *{}* ({})\n", field.label(), hint),
        None => format!("• *{}*\n", field.label()),
    }
}
