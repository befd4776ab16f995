//! HTTP handlers for the webhook endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

use crate::adapters::whatsapp::{SignatureVerifier, WebhookPayload, SIGNATURE_HEADER};
use crate::application::{HandleInboundMessageCommand, HandleInboundMessageHandler};
use crate::domain::foundation::SenderId;
use crate::ports::SessionStore;

use super::dto::{AckResponse, ErrorResponse, HealthResponse, VerificationQuery};

/// Application state for webhook endpoints.
#[derive(Clone)]
pub struct WebhookAppState {
    /// Dialogue controller
    pub handler: Arc<HandleInboundMessageHandler>,
    /// Session store, read for the health probe
    pub sessions: Arc<dyn SessionStore>,
    verify_token: Arc<Secret<String>>,
    signature_verifier: Option<Arc<SignatureVerifier>>,
}

impl WebhookAppState {
    pub fn new(
        handler: Arc<HandleInboundMessageHandler>,
        sessions: Arc<dyn SessionStore>,
        verify_token: impl Into<String>,
    ) -> Self {
        Self {
            handler,
            sessions,
            verify_token: Arc::new(Secret::new(verify_token.into())),
            signature_verifier: None,
        }
    }

    /// Requires a valid `X-Hub-Signature-256` on every inbound event.
    pub fn with_signature_verifier(mut self, verifier: SignatureVerifier) -> Self {
        self.signature_verifier = Some(Arc::new(verifier));
        self
    }

    fn token_matches(&self, candidate: &str) -> bool {
        let expected = self.verify_token.expose_secret().as_bytes();
        candidate.as_bytes().ct_eq(expected).into()
    }
}

/// GET /webhook - Meta subscription handshake
///
/// Echoes `hub.challenge` only for `subscribe` with the configured token.
pub async fn verify_webhook(
    State(state): State<WebhookAppState>,
    Query(query): Query<VerificationQuery>,
) -> Response {
    let subscribe = query.mode.as_deref() == Some("subscribe");
    let token_ok = query
        .verify_token
        .as_deref()
        .is_some_and(|token| state.token_matches(token));

    match query.challenge {
        Some(challenge) if subscribe && token_ok => {
            tracing::info!("Webhook verified");
            (StatusCode::OK, challenge).into_response()
        }
        _ => {
            tracing::warn!(mode = ?query.mode, "Webhook verification failed");
            (StatusCode::FORBIDDEN, "Verification failed").into_response()
        }
    }
}

/// POST /webhook - Inbound WhatsApp events
///
/// Always acknowledges with 200 once the signature (if required) checks out;
/// processing problems are logged, never surfaced to Meta.
pub async fn receive_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(verifier) = &state.signature_verifier {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if let Err(e) = verifier.verify(&body, signature) {
            tracing::warn!(error = %e, "Rejected webhook with bad signature");
            let error = ErrorResponse::new("INVALID_SIGNATURE", e.to_string());
            return (StatusCode::UNAUTHORIZED, Json(error)).into_response();
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed webhook payload");
            return Json(AckResponse::ignored()).into_response();
        }
    };

    let mut processed = 0usize;
    for text in payload.extract_text_messages() {
        let sender = match SenderId::new(text.from.as_str()) {
            Ok(sender) => sender,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping message with invalid sender");
                continue;
            }
        };

        tracing::info!(
            sender = %sender,
            message_id = ?text.message_id,
            chars = text.body.chars().count(),
            "Inbound message"
        );

        let cmd = HandleInboundMessageCommand::new(sender.clone(), text.body)
            .with_contact_name(text.contact_name);
        processed += 1;
        match state.handler.handle(cmd).await {
            Ok(outcome) => tracing::debug!(sender = %sender, ?outcome, "Message handled"),
            Err(e) => tracing::error!(sender = %sender, error = %e, "Failed to handle message"),
        }
    }

    if processed > 0 {
        Json(AckResponse::ok()).into_response()
    } else {
        Json(AckResponse::ignored()).into_response()
    }
}

/// GET /health - Liveness probe
pub async fn health(State(state): State<WebhookAppState>) -> Response {
    match state.sessions.len().await {
        Ok(active_sessions) => Json(HealthResponse {
            status: "ok".to_string(),
            active_sessions,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach session store");
            let error = ErrorResponse::new("SESSION_STORE_UNAVAILABLE", e.to_string());
            (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
        }
    }
}
