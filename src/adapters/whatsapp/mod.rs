//! WhatsApp Cloud API adapters.
//!
//! - `WhatsAppCloudClient` - outbound text delivery (`NotificationGateway`)
//! - `WebhookPayload` - inbound webhook event shape
//! - `SignatureVerifier` - `X-Hub-Signature-256` check over the raw body

mod cloud_client;
mod signature;
mod webhook_types;

pub use cloud_client::{CloudApiConfig, WhatsAppCloudClient};
pub use signature::{SignatureVerifier, WebhookError, SIGNATURE_HEADER};
pub use webhook_types::{
    ChangeValue, Contact, ContactProfile, InboundMessage, InboundText, TextBody, WebhookChange,
    WebhookEntry, WebhookPayload,
};
