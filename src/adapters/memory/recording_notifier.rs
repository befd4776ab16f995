//! Notifier that logs and remembers outbound messages instead of sending them.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::SenderId;
use crate::ports::{NotificationError, NotificationGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: SenderId,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<SentMessage>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    /// Bodies sent to one sender, oldest first.
    pub async fn sent_to(&self, to: &SenderId) -> Vec<String> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|m| &m.to == to)
            .map(|m| m.body.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotifier {
    async fn send_text(&self, to: &SenderId, body: &str) -> Result<(), NotificationError> {
        tracing::debug!(to = %to, chars = body.chars().count(), "Recorded outbound message");
        self.sent.write().await.push(SentMessage {
            to: to.clone(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filters_by_recipient() {
        let notifier = RecordingNotifier::new();
        let a = SenderId::new("a").unwrap();
        let b = SenderId::new("b").unwrap();
        notifier.send_text(&a, "hello a").await.unwrap();
        notifier.send_text(&b, "hello b").await.unwrap();

        assert_eq!(notifier.sent().await.len(), 2);
        assert_eq!(notifier.sent_to(&b).await, vec!["hello b".to_string()]);
    }
}
