//! Station configuration.
//!
//! The device has no configuration file: it runs on [`StationConfig::default`].
//! Host builds may overlay values from the environment before validating.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sensor::DEFAULT_SETTLE_DELAY_MS;

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// The configuration is internally inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What the sensor routes answer when the poll for the current request fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Answer 200 with the last good reading (or an empty body if there is none).
    #[default]
    ServeStale,
    /// Answer 503 with an explicit error body.
    Unavailable,
}

impl std::str::FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stale" | "serveStale" => Ok(Self::ServeStale),
            "unavailable" | "503" => Ok(Self::Unavailable),
            other => Err(ConfigError::InvalidValue {
                key: "failure_policy".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Station configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationConfig {
    /// Station name, used in logs.
    pub name: String,

    /// HTTP server port.
    pub http_port: u16,

    /// Settling delay before every sensor poll, in milliseconds.
    pub settle_delay_ms: u32,

    /// Behavior of `/temp` and `/humidity` when a poll fails.
    pub failure_policy: FailurePolicy,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: "weather-station".to_string(),
            http_port: 80,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            failure_policy: FailurePolicy::ServeStale,
        }
    }
}

impl StationConfig {
    /// Check the configuration for values the station cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_port == 0 {
            return Err(ConfigError::Invalid("http_port must not be 0".to_string()));
        }
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = StationConfig::default();
        assert_eq!(config.http_port, 80);
        assert_eq!(config.settle_delay_ms, 2000);
        assert_eq!(config.failure_policy, FailurePolicy::ServeStale);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let config = StationConfig {
            http_port: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{"name":"porch","httpPort":8080,"settleDelayMs":500,"failurePolicy":"unavailable"}"#;
        let config: StationConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.name, "porch");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.settle_delay_ms, 500);
        assert_eq!(config.failure_policy, FailurePolicy::Unavailable);
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!("stale".parse::<FailurePolicy>().unwrap(), FailurePolicy::ServeStale);
        assert_eq!("503".parse::<FailurePolicy>().unwrap(), FailurePolicy::Unavailable);
        assert!("sometimes".parse::<FailurePolicy>().is_err());
    }
}
