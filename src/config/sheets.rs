//! Google Sheets configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::whatsapp::is_http_url;

/// Google Sheets configuration
///
/// When absent, completed records are kept in memory only.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Target spreadsheet ID
    pub spreadsheet_id: String,

    /// A1 range rows are appended to
    #[serde(default = "default_range")]
    pub range: String,

    /// OAuth bearer access token
    pub access_token: Secret<String>,

    /// Sheets API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SheetsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate Sheets configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.spreadsheet_id.is_empty() {
            return Err(ValidationError::MissingRequired("sheets.spreadsheet_id"));
        }
        if self.access_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("sheets.access_token"));
        }
        if self.range.is_empty() {
            return Err(ValidationError::MissingRequired("sheets.range"));
        }
        if !is_http_url(&self.api_base) {
            return Err(ValidationError::InvalidUrl("sheets.api_base"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_range() -> String {
    "Sheet1!A:E".to_string()
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_timeout() -> u64 {
    10
}
