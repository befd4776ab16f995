//! WhatsApp Cloud API client - outbound text messages.
//!
//! # Configuration
//!
//! ```ignore
//! let config = CloudApiConfig::new(access_token, phone_number_id)
//!     .with_api_version("v20.0")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let client = WhatsAppCloudClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::domain::foundation::SenderId;
use crate::ports::{NotificationError, NotificationGateway};

/// Configuration for the Cloud API client.
#[derive(Debug, Clone)]
pub struct CloudApiConfig {
    access_token: Secret<String>,
    /// Business phone number the messages are sent from.
    pub phone_number_id: String,
    /// Graph API base URL (default: https://graph.facebook.com).
    pub api_base: String,
    /// Graph API version segment (default: v20.0).
    pub api_version: String,
    pub timeout: Duration,
}

impl CloudApiConfig {
    pub fn new(access_token: impl Into<String>, phone_number_id: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            phone_number_id: phone_number_id.into(),
            api_base: "https://graph.facebook.com".to_string(),
            api_version: "v20.0".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Sends text replies through the WhatsApp Cloud API.
pub struct WhatsAppCloudClient {
    config: CloudApiConfig,
    client: Client,
}

impl WhatsAppCloudClient {
    pub fn new(config: CloudApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            self.config.api_version,
            self.config.phone_number_id
        )
    }
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: OutboundText<'a>,
}

#[derive(Debug, Serialize)]
struct OutboundText<'a> {
    body: &'a str,
}

impl<'a> OutboundMessage<'a> {
    fn text(to: &'a str, body: &'a str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: OutboundText { body },
        }
    }
}

#[async_trait]
impl NotificationGateway for WhatsAppCloudClient {
    async fn send_text(&self, to: &SenderId, body: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(self.config.access_token())
            .json(&OutboundMessage::text(to.as_str(), body))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::Timeout
                } else if e.is_connect() {
                    NotificationError::Transport(format!("Connection failed: {}", e))
                } else {
                    NotificationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %to, "WhatsApp message sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            to = %to,
            status = status.as_u16(),
            body = %body,
            "WhatsApp API rejected outbound message"
        );
        Err(NotificationError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PHONE_ID: &str = "1098765";

    fn client(server: &MockServer) -> WhatsAppCloudClient {
        let config = CloudApiConfig::new("test-token", PHONE_ID)
            .with_api_base(server.uri())
            .with_timeout(Duration::from_millis(500));
        WhatsAppCloudClient::new(config).unwrap()
    }

    fn recipient() -> SenderId {
        SenderId::new("919876543210").unwrap()
    }

    #[test]
    fn config_defaults_target_graph_api() {
        let config = CloudApiConfig::new("t", "42");
        assert_eq!(config.api_base, "https://graph.facebook.com");
        assert_eq!(config.api_version, "v20.0");
        assert!(!format!("{:?}", config).contains("\"t\""));
    }

    #[tokio::test]
    async fn posts_text_message_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v20.0/{}/messages", PHONE_ID)))
            .and(bearer_token("test-token"))
            .and(body_json(json!({
                "messaging_product": "whatsapp",
                "to": "919876543210",
                "type": "text",
                "text": {"body": "Hello 👋"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": [{"id": "wamid.x"}]})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).send_text(&recipient(), "Hello 👋").await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let err = client(&server).send_text(&recipient(), "hi").await.unwrap_err();
        match err {
            NotificationError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid token");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_api_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = client(&server).send_text(&recipient(), "hi").await.unwrap_err();
        assert!(matches!(err, NotificationError::Timeout));
    }

    #[tokio::test]
    async fn unreachable_api_is_transport_error() {
        let config = CloudApiConfig::new("t", PHONE_ID)
            .with_api_base("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));
        let client = WhatsAppCloudClient::new(config).unwrap();

        let err = client.send_text(&recipient(), "hi").await.unwrap_err();
        assert!(matches!(err, NotificationError::Transport(_)));
    }
}
