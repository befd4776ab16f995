//! Notification Gateway Port - Outbound text delivery.

use async_trait::async_trait;

use crate::domain::foundation::SenderId;

/// Errors from delivering a message.
///
/// The controller logs these and carries on; delivery is never retried.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Delivery request failed: {0}")]
    Transport(String),

    #[error("Delivery timed out")]
    Timeout,

    #[error("Platform rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Port for sending a text reply to a sender
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send_text(&self, to: &SenderId, body: &str) -> Result<(), NotificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_error_includes_status_and_body() {
        let err = NotificationError::Rejected {
            status: 401,
            body: "invalid token".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("invalid token"));
    }
}
