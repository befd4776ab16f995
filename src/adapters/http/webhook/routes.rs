//! Axum router configuration for webhook endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health, receive_webhook, verify_webhook, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
/// - `GET /webhook` - Verification handshake
/// - `POST /webhook` - Inbound events (signature verified when configured)
/// - `GET /health` - Liveness probe
///
/// # Example
///
/// ```ignore
/// let state = WebhookAppState::new(handler, sessions, verify_token);
/// let app = webhook_router(state);
/// axum::serve(listener, app).await?;
/// ```
pub fn webhook_router(state: WebhookAppState) -> Router {
    Router::new()
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
