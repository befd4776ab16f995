//! WhatsApp webhook signature verification.
//!
//! Meta signs every event with HMAC-SHA256 of the raw request body, keyed by
//! the app secret, and sends it as `X-Hub-Signature-256: sha256=<hex>`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing X-Hub-Signature-256 header")]
    MissingSignature,

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Signature does not match payload")]
    InvalidSignature,
}

/// Verifier for WhatsApp webhook payload signatures.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    app_secret: Secret<String>,
}

impl SignatureVerifier {
    pub fn new(app_secret: impl Into<String>) -> Self {
        Self {
            app_secret: Secret::new(app_secret.into()),
        }
    }

    /// Checks `header` (the raw `X-Hub-Signature-256` value) against `payload`.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - no header was sent
    /// - `MalformedSignature` - header lacks the `sha256=` prefix or is not hex
    /// - `InvalidSignature` - digest does not match
    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> Result<(), WebhookError> {
        let header = header.ok_or(WebhookError::MissingSignature)?;
        let hex_digest = header
            .trim()
            .strip_prefix(SIGNATURE_PREFIX)
            .ok_or_else(|| WebhookError::MalformedSignature("missing sha256= prefix".to_string()))?;
        let provided = hex::decode(hex_digest)
            .map_err(|_| WebhookError::MalformedSignature("invalid hex".to_string()))?;

        let expected = self.compute_signature(payload);
        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }

    fn compute_signature(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.app_secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
