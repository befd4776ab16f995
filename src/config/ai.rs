//! Field classifier configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Optional LLM classifier configuration
///
/// With no API key for the selected provider the classifier is disabled and
/// only pattern extraction runs.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Provider used for classification
    #[serde(default)]
    pub provider: AiProvider,

    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    /// Anthropic API key
    pub anthropic_api_key: Option<Secret<String>>,

    /// Model override; provider default when unset
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    OpenAI,
    Anthropic,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key for the selected provider, if set and non-empty
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.provider {
            AiProvider::OpenAI => self.openai_api_key.as_ref(),
            AiProvider::Anthropic => self.anthropic_api_key.as_ref(),
        };
        key.map(|k| k.expose_secret().as_str())
            .filter(|k| !k.is_empty())
    }

    /// Check if the classifier should be enabled
    pub fn is_enabled(&self) -> bool {
        self.api_key().is_some()
    }

    fn has_any_key(&self) -> bool {
        [&self.openai_api_key, &self.anthropic_api_key]
            .into_iter()
            .flatten()
            .any(|k| !k.expose_secret().is_empty())
    }

    /// Validate AI configuration
    ///
    /// Rejects a key set only for the provider that is not selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.has_any_key() && !self.is_enabled() {
            return Err(match self.provider {
                AiProvider::OpenAI => ValidationError::MissingRequired("ai.openai_api_key"),
                AiProvider::Anthropic => ValidationError::MissingRequired("ai.anthropic_api_key"),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            openai_api_key: None,
            anthropic_api_key: None,
            model: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> Option<Secret<String>> {
        Some(Secret::new(value.to_string()))
    }

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider, AiProvider::OpenAI);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(!config.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enabled_with_selected_provider_key() {
        let config = AiConfig {
            provider: AiProvider::Anthropic,
            anthropic_api_key: key("sk-ant-xxx"),
            ..Default::default()
        };
        assert!(config.is_enabled());
        assert_eq!(config.api_key(), Some("sk-ant-xxx"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_key_for_other_provider_is_rejected() {
        let config = AiConfig {
            provider: AiProvider::OpenAI,
            anthropic_api_key: key("sk-ant-xxx"),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("ai.openai_api_key"))
        );
    }

    #[test]
    fn test_empty_key_means_disabled() {
        let config = AiConfig {
            openai_api_key: key(""),
            ..Default::default()
        };
        assert!(!config.is_enabled());
        assert!(config.validate().is_ok());
    }
}
