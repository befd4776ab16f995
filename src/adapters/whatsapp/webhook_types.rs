//! Inbound WhatsApp webhook payload.
//!
//! Only the parts of the Cloud API event the intake flow reads are modelled;
//! everything else (statuses, metadata, media) is ignored by serde. Every
//! collection defaults to empty so partial events still deserialize.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub wa_id: Option<String>,
    #[serde(default)]
    pub profile: Option<ContactProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactProfile {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

/// A text message pulled out of a webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub from: String,
    pub body: String,
    pub message_id: Option<String>,
    pub contact_name: Option<String>,
}

impl WebhookPayload {
    /// Returns the first text message of every change value, in event order.
    ///
    /// Non-text messages, messages without a sender and empty bodies are
    /// skipped. The contact name is taken from the contact whose `wa_id`
    /// matches the sender, falling back to the first contact listed.
    pub fn extract_text_messages(&self) -> Vec<InboundText> {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .filter_map(|change| first_text(&change.value))
            .collect()
    }
}

fn first_text(value: &ChangeValue) -> Option<InboundText> {
    let message = value.messages.iter().find(|m| {
        m.kind == "text"
            && !m.from.trim().is_empty()
            && m.text.as_ref().is_some_and(|t| !t.body.trim().is_empty())
    })?;
    let body = message.text.as_ref()?.body.clone();

    let contact = value
        .contacts
        .iter()
        .find(|c| c.wa_id.as_deref() == Some(message.from.as_str()))
        .or_else(|| value.contacts.first());
    let contact_name = contact
        .and_then(|c| c.profile.as_ref())
        .and_then(|p| p.name.clone());

    Some(InboundText {
        from: message.from.clone(),
        body,
        message_id: message.id.clone(),
        contact_name,
    })
}
