//! HTTP adapter for the WhatsApp webhook.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::WebhookAppState;
pub use routes::webhook_router;
