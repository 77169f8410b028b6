//! Process-level configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Process configuration: environment and log output
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Tracing filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log line format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ServerConfig {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_level.trim().is_empty() {
            return Err(ValidationError::EmptyLogLevel);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,waypoint=debug".to_string()
}
