//! Session lifetime configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Session lifetime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a dialogue is discarded on the next message
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Idle time after which the sweeper removes a session outright
    #[serde(default = "default_retention")]
    pub retention_secs: u64,

    /// How often the sweeper runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidSessionTimeout);
        }
        if self.retention_secs < self.timeout_secs {
            return Err(ValidationError::RetentionShorterThanTimeout);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            retention_secs: default_retention(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    300
}

fn default_retention() -> u64 {
    86_400
}

fn default_sweep_interval() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert_eq!(config.retention(), Duration::from_secs(86_400));
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = SessionConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSessionTimeout));
    }

    #[test]
    fn test_retention_must_cover_timeout() {
        let config = SessionConfig {
            timeout_secs: 600,
            retention_secs: 300,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::RetentionShorterThanTimeout)
        );
    }
}
