//! LLM Field Classifier - `FieldClassifier` over OpenAI or Anthropic.
//!
//! The model is told which fields are still missing and asked for a bare
//! JSON object. Whatever comes back goes through `parse_classifier_response`,
//! and only keys for missing fields survive.
//!
//! # Configuration
//!
//! ```ignore
//! let config = LlmClassifierConfig::anthropic(api_key)
//!     .with_model("claude-3-5-haiku-latest")
//!     .with_timeout(Duration::from_secs(15));
//!
//! let classifier = LlmFieldClassifier::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::intake::{
    parse_classifier_response, ExtractionError, FieldDelta, FieldName, FieldRecord,
};
use crate::ports::FieldClassifier;

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Upper bound on completion length; a five-key object fits easily.
const MAX_TOKENS: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierProvider {
    OpenAI,
    Anthropic,
}

impl ClassifierProvider {
    pub fn name(&self) -> &'static str {
        match self {
            ClassifierProvider::OpenAI => "openai",
            ClassifierProvider::Anthropic => "anthropic",
        }
    }
}

/// Configuration for the LLM classifier.
#[derive(Debug, Clone)]
pub struct LlmClassifierConfig {
    provider: ClassifierProvider,
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl LlmClassifierConfig {
    /// OpenAI chat completions with `gpt-4o-mini`.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ClassifierProvider::OpenAI,
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Anthropic messages with `claude-3-5-haiku-latest`.
    pub fn anthropic(api_key: impl Into<String>) -> Self {
        Self {
            provider: ClassifierProvider::Anthropic,
            api_key: Secret::new(api_key.into()),
            model: "claude-3-5-haiku-latest".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> ClassifierProvider {
        self.provider
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

pub struct LlmFieldClassifier {
    config: LlmClassifierConfig,
    client: Client,
}

impl LlmFieldClassifier {
    pub fn new(config: LlmClassifierConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn complete_openai(&self, system: String, text: &str) -> Result<String, ExtractionError> {
        let request = OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::new("system", system),
                ChatMessage::new("user", text),
            ],
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url()))
            .bearer_auth(self.config.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let body: OpenAIResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ExtractionError::InvalidResponse("No choices in response".to_string()))
    }

    async fn complete_anthropic(&self, system: String, text: &str) -> Result<String, ExtractionError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            system,
            messages: vec![ChatMessage::new("user", text)],
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url()))
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let body: AnthropicResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();
        if text.is_empty() {
            return Err(ExtractionError::InvalidResponse("No text content in response".to_string()));
        }
        Ok(text)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ExtractionError {
        if e.is_timeout() {
            ExtractionError::Unavailable(format!(
                "{} timed out after {}s",
                self.config.provider.name(),
                self.config.timeout.as_secs()
            ))
        } else if e.is_connect() {
            ExtractionError::Unavailable(format!("Connection failed: {}", e))
        } else {
            ExtractionError::Unavailable(e.to_string())
        }
    }
}

async fn check_status(response: Response) -> Result<Response, ExtractionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ExtractionError::Unavailable(format!(
        "status {}: {}",
        status.as_u16(),
        body
    )))
}

/// Instructions listing the keys the model may return.
fn system_prompt(missing: &[FieldName]) -> String {
    let keys = missing
        .iter()
        .map(|field| match field.hint() {
            Some(hint) => format!("- \"{}\" ({}, {})", field.key(), field.label(), hint),
            None => format!("- \"{}\" ({})", field.key(), field.label()),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You extract details from a customer's chat message for a support ticket.\n\
         Return only a JSON object. Allowed keys:\n{}\n\
         Include a key only when its value is clearly stated in the message. \
         Copy values as written. Do not guess and do not add other keys.",
        keys
    )
}

#[async_trait]
impl FieldClassifier for LlmFieldClassifier {
    async fn classify(&self, text: &str, known: &FieldRecord) -> Result<FieldDelta, ExtractionError> {
        let missing = known.missing();
        if missing.is_empty() || text.trim().is_empty() {
            return Ok(FieldDelta::new());
        }

        let system = system_prompt(&missing);
        let raw = match self.config.provider {
            ClassifierProvider::OpenAI => self.complete_openai(system, text).await?,
            ClassifierProvider::Anthropic => self.complete_anthropic(system, text).await?,
        };

        let delta = parse_classifier_response(&raw)?;
        let kept = FieldDelta::from_pairs(delta.iter().filter(|(field, _)| missing.contains(field)));
        tracing::debug!(
            provider = self.config.provider.name(),
            found = kept.len(),
            "Classifier response parsed"
        );
        Ok(kept)
    }

    fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

// ----- Provider API Types -----

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: ChatMessage,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    system: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn known_name() -> FieldRecord {
        let mut record = FieldRecord::new();
        record.merge(&FieldDelta::from_pairs([(FieldName::Name, "Deepa Nair")]));
        record
    }

    fn openai_reply(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
        })
    }

    fn anthropic_reply(text: &str) -> serde_json::Value {
        json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-haiku-latest",
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    fn openai(server: &MockServer) -> LlmFieldClassifier {
        LlmFieldClassifier::new(
            LlmClassifierConfig::openai("sk-test")
                .with_base_url(server.uri())
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap()
    }

    fn anthropic(server: &MockServer) -> LlmFieldClassifier {
        LlmFieldClassifier::new(
            LlmClassifierConfig::anthropic("ak-test")
                .with_base_url(server.uri())
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap()
    }

    mod config {
        use super::*;

        #[test]
        fn provider_defaults() {
            let openai = LlmClassifierConfig::openai("k");
            assert_eq!(openai.provider(), ClassifierProvider::OpenAI);
            assert_eq!(openai.model, "gpt-4o-mini");

            let anthropic = LlmClassifierConfig::anthropic("k").with_model("claude-x");
            assert_eq!(anthropic.provider(), ClassifierProvider::Anthropic);
            assert_eq!(anthropic.model, "claude-x");
            assert_eq!(anthropic.base_url, "https://api.anthropic.com");
        }

        #[test]
        fn prompt_lists_only_missing_keys() {
            let prompt = system_prompt(&[FieldName::Phone, FieldName::IssueDescription]);
            assert!(prompt.contains("\"phone\""));
            assert!(prompt.contains("\"issue_description\""));
            assert!(!prompt.contains("\"name\""));
        }
    }

    mod openai_provider {
        use super::*;

        #[tokio::test]
        async fn returns_missing_fields_only() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/chat/completions"))
                .and(bearer_token("sk-test"))
                .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(
                    r#"{"name": "Someone Else", "issue_description": "parcel arrived damaged"}"#,
                )))
                .expect(1)
                .mount(&server)
                .await;

            let delta = openai(&server)
                .classify("the parcel arrived damaged", &known_name())
                .await
                .unwrap();

            assert_eq!(delta.get(FieldName::Name), None);
            assert_eq!(delta.get(FieldName::IssueDescription), Some("parcel arrived damaged"));
        }

        #[tokio::test]
        async fn server_error_is_unavailable() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
                .mount(&server)
                .await;

            let err = openai(&server)
                .classify("hello", &FieldRecord::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ExtractionError::Unavailable(_)));
        }

        #[tokio::test]
        async fn timeout_is_unavailable() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(openai_reply("{}"))
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&server)
                .await;

            let err = openai(&server)
                .classify("hello", &FieldRecord::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ExtractionError::Unavailable(_)));
        }

        #[tokio::test]
        async fn prose_without_json_is_invalid() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("Sorry, no details.")))
                .mount(&server)
                .await;

            let err = openai(&server)
                .classify("hello", &FieldRecord::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ExtractionError::InvalidResponse(_)));
        }
    }

    mod anthropic_provider {
        use super::*;

        #[tokio::test]
        async fn sends_version_header_and_reads_fenced_json() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1/messages"))
                .and(header("x-api-key", "ak-test"))
                .and(header("anthropic-version", ANTHROPIC_API_VERSION))
                .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply(
                    "```json\n{\"reference_id\": \"ORD7781\"}\n```",
                )))
                .expect(1)
                .mount(&server)
                .await;

            let delta = anthropic(&server)
                .classify("order ORD7781 never came", &known_name())
                .await
                .unwrap();
            assert_eq!(delta.get(FieldName::ReferenceId), Some("ORD7781"));
        }
    }

    #[tokio::test]
    async fn complete_record_skips_the_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("{}")))
            .expect(0)
            .mount(&server)
            .await;

        let mut record = FieldRecord::new();
        record.merge(&FieldDelta::from_pairs(
            FieldName::ALL.iter().map(|field| (*field, "value1")),
        ));

        let delta = openai(&server).classify("anything", &record).await.unwrap();
        assert!(delta.is_empty());
    }
}
