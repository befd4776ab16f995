//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `INTAKE_BOT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use intake_bot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod server;
mod session;
mod sheets;
mod whatsapp;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use session::SessionConfig;
pub use sheets::SheetsConfig;
pub use whatsapp::WhatsAppConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// WhatsApp Cloud API configuration
    pub whatsapp: WhatsAppConfig,

    /// Session timeout and retention
    #[serde(default)]
    pub session: SessionConfig,

    /// Google Sheets persistence (in-memory when absent)
    pub sheets: Option<SheetsConfig>,

    /// Optional LLM field classifier
    #[serde(default)]
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `INTAKE_BOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `INTAKE_BOT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `INTAKE_BOT__WHATSAPP__VERIFY_TOKEN=...` -> `whatsapp.verify_token = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTAKE_BOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.whatsapp.validate(&self.server.environment)?;
        self.session.validate()?;
        if let Some(sheets) = &self.sheets {
            sheets.validate()?;
        }
        self.ai.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const OPTIONAL_VARS: &[&str] = &[
        "INTAKE_BOT__SERVER__PORT",
        "INTAKE_BOT__SERVER__ENVIRONMENT",
        "INTAKE_BOT__WHATSAPP__APP_SECRET",
        "INTAKE_BOT__SESSION__TIMEOUT_SECS",
        "INTAKE_BOT__SHEETS__SPREADSHEET_ID",
        "INTAKE_BOT__SHEETS__ACCESS_TOKEN",
        "INTAKE_BOT__AI__PROVIDER",
        "INTAKE_BOT__AI__ANTHROPIC_API_KEY",
    ];

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        env::set_var("INTAKE_BOT__WHATSAPP__VERIFY_TOKEN", "verify-me");
        env::set_var("INTAKE_BOT__WHATSAPP__ACCESS_TOKEN", "EAAGtest");
        env::set_var("INTAKE_BOT__WHATSAPP__PHONE_NUMBER_ID", "1098765");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("INTAKE_BOT__WHATSAPP__VERIFY_TOKEN");
        env::remove_var("INTAKE_BOT__WHATSAPP__ACCESS_TOKEN");
        env::remove_var("INTAKE_BOT__WHATSAPP__PHONE_NUMBER_ID");
        for var in OPTIONAL_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.whatsapp.verify_token.expose_secret(), "verify-me");
        assert_eq!(config.whatsapp.phone_number_id, "1098765");
        assert_eq!(config.whatsapp.api_version, "v20.0");
        assert!(config.sheets.is_none());
        assert!(!config.ai.is_enabled());
    }

    #[test]
    fn test_missing_whatsapp_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_validate_minimal_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_server_and_session_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.session.timeout_secs, 300);
    }

    #[test]
    fn test_custom_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("INTAKE_BOT__SERVER__PORT", "3000");
        env::set_var("INTAKE_BOT__SESSION__TIMEOUT_SECS", "120");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.timeout_secs, 120);
    }

    #[test]
    fn test_production_without_app_secret_is_invalid() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("INTAKE_BOT__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::AppSecretRequiredInProduction)
        );
    }

    #[test]
    fn test_optional_sections_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("INTAKE_BOT__SHEETS__SPREADSHEET_ID", "1AbC");
        env::set_var("INTAKE_BOT__SHEETS__ACCESS_TOKEN", "ya29.token");
        env::set_var("INTAKE_BOT__AI__PROVIDER", "anthropic");
        env::set_var("INTAKE_BOT__AI__ANTHROPIC_API_KEY", "sk-ant-xxx");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let sheets = config.sheets.as_ref().unwrap();
        assert_eq!(sheets.spreadsheet_id, "1AbC");
        assert_eq!(sheets.range, "Sheet1!A:E");
        assert_eq!(config.ai.provider, AiProvider::Anthropic);
        assert!(config.ai.is_enabled());
        assert!(config.validate().is_ok());
    }
}
