//! WhatsApp Cloud API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// WhatsApp Cloud API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppConfig {
    /// Token Meta echoes during the webhook handshake
    pub verify_token: Secret<String>,

    /// Graph API access token for sending messages
    pub access_token: Secret<String>,

    /// Business phone number ID messages are sent from
    pub phone_number_id: String,

    /// Graph API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Graph API version segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// App secret for `X-Hub-Signature-256` verification
    pub app_secret: Option<Secret<String>>,

    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl WhatsAppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// App secret, if one is configured and non-empty
    pub fn app_secret(&self) -> Option<&str> {
        self.app_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.is_empty())
    }

    /// Validate WhatsApp configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.verify_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("whatsapp.verify_token"));
        }
        if self.access_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("whatsapp.access_token"));
        }
        if self.phone_number_id.is_empty() {
            return Err(ValidationError::MissingRequired("whatsapp.phone_number_id"));
        }
        if !is_http_url(&self.api_base) {
            return Err(ValidationError::InvalidUrl("whatsapp.api_base"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if *environment == Environment::Production && self.app_secret().is_none() {
            return Err(ValidationError::AppSecretRequiredInProduction);
        }
        Ok(())
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn default_api_base() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v20.0".to_string()
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WhatsAppConfig {
        WhatsAppConfig {
            verify_token: Secret::new("verify".to_string()),
            access_token: Secret::new("EAAG".to_string()),
            phone_number_id: "1098765".to_string(),
            api_base: default_api_base(),
            api_version: default_api_version(),
            app_secret: None,
            timeout_secs: default_timeout(),
        }
    }

    #[test]
    fn test_valid_development_config() {
        assert!(config().validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_production_requires_app_secret() {
        assert_eq!(
            config().validate(&Environment::Production),
            Err(ValidationError::AppSecretRequiredInProduction)
        );

        let with_secret = WhatsAppConfig {
            app_secret: Some(Secret::new("abc".to_string())),
            ..config()
        };
        assert!(with_secret.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_empty_app_secret_counts_as_missing() {
        let config = WhatsAppConfig {
            app_secret: Some(Secret::new(String::new())),
            ..config()
        };
        assert_eq!(config.app_secret(), None);
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let config = WhatsAppConfig {
            verify_token: Secret::new(String::new()),
            ..config()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired("whatsapp.verify_token"))
        );
    }

    #[test]
    fn test_api_base_must_be_http() {
        let config = WhatsAppConfig {
            api_base: "graph.facebook.com".to_string(),
            ..config()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidUrl("whatsapp.api_base"))
        );
    }

    #[test]
    fn test_debug_hides_tokens() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("EAAG"));
        assert!(!debug.contains("\"verify\""));
    }
}
