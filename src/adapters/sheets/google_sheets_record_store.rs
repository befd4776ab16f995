//! Appends completed records as rows to a Google Sheet.
//!
//! Uses the Sheets v4 `values:append` endpoint with `valueInputOption=RAW`,
//! so values land exactly as collected. Authentication is a bearer access
//! token obtained outside this service.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::domain::intake::CompletedRecord;
use crate::ports::{PersistenceError, PersistenceGateway};

#[derive(Debug, Clone)]
pub struct SheetsApiConfig {
    access_token: Secret<String>,
    pub spreadsheet_id: String,
    /// A1 range the rows are appended after (default: Sheet1!A:E).
    pub range: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl SheetsApiConfig {
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            spreadsheet_id: spreadsheet_id.into(),
            range: "Sheet1!A:E".to_string(),
            api_base: "https://sheets.googleapis.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
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

pub struct GoogleSheetsRecordStore {
    config: SheetsApiConfig,
    client: Client,
}

impl GoogleSheetsRecordStore {
    pub fn new(config: SheetsApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn append_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.config.api_base.trim_end_matches('/'),
            self.config.spreadsheet_id,
            self.config.range
        )
    }
}

#[derive(Debug, Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

#[async_trait]
impl PersistenceGateway for GoogleSheetsRecordStore {
    async fn append(&self, record: &CompletedRecord) -> Result<(), PersistenceError> {
        let request = AppendRequest {
            values: vec![record.to_row()],
        };

        let response = self
            .client
            .post(self.append_url())
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(self.config.access_token())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PersistenceError::Transport(format!(
                        "Request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else {
                    PersistenceError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Sheets append rejected");
            return Err(PersistenceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(reference_id = %record.reference_id, "Record appended to sheet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intake::{FieldDelta, FieldName, FieldRecord};
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> CompletedRecord {
        let mut fields = FieldRecord::new();
        fields.merge(&FieldDelta::from_pairs([
            (FieldName::Name, "Anil Mehta"),
            (FieldName::Phone, "9123456780"),
            (FieldName::DateOfIssue, "05-02-2024"),
            (FieldName::ReferenceId, "TKT4521"),
            (FieldName::IssueDescription, "refund not received"),
        ]));
        fields.to_completed().unwrap()
    }

    fn store(server: &MockServer) -> GoogleSheetsRecordStore {
        let config = SheetsApiConfig::new("sheet-123", "sheets-token")
            .with_api_base(server.uri())
            .with_timeout(Duration::from_millis(500));
        GoogleSheetsRecordStore::new(config).unwrap()
    }

    #[tokio::test]
    async fn appends_row_in_field_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet-123/values/Sheet1!A:E:append"))
            .and(query_param("valueInputOption", "RAW"))
            .and(bearer_token("sheets-token"))
            .and(body_json(json!({
                "values": [["Anil Mehta", "9123456780", "05-02-2024", "TKT4521", "refund not received"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updates": {"updatedRows": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).append(&record()).await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let err = store(&server).append(&record()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Rejected { status: 403, .. }));
    }

    #[tokio::test]
    async fn timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = store(&server).append(&record()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Transport(_)));
    }
}
