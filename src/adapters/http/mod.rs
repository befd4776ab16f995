//! HTTP adapters - Webhook endpoint implementations.
//!
//! - `GET /webhook` - Meta verification handshake
//! - `POST /webhook` - Inbound message events
//! - `GET /health` - Liveness probe with active session count

pub mod webhook;

pub use webhook::{webhook_router, WebhookAppState};
