//! Adapters - Implementations of ports for external systems.
//!
//! - `memory` - In-process session store, record store and notifier
//! - `whatsapp` - WhatsApp Cloud API client and webhook payload handling
//! - `sheets` - Google Sheets record store
//! - `ai` - LLM-backed field classifier
//! - `http` - Axum webhook endpoints

pub mod ai;
pub mod http;
pub mod memory;
pub mod sheets;
pub mod whatsapp;
