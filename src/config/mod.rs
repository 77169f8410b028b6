//! Application configuration module
//!
//! Configuration is loaded with the `config` and `dotenvy` crates from an
//! optional `waypoint.toml` file and environment variables with the
//! `WAYPOINT` prefix. Nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use waypoint::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Keeping {} outcomes", config.router.metrics_capacity);
//! ```

mod error;
mod router;
mod server;

pub use error::{ConfigError, ValidationError};
pub use router::RouterConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "WAYPOINT";
const DEFAULT_FILE: &str = "waypoint";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub server: ServerConfig,

    /// Routing engine sizing and timing
    #[serde(default)]
    pub router: RouterConfig,
}

impl AppConfig {
    /// Load configuration from `waypoint.toml` (if present) and the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `waypoint.{toml,yaml,json}` from the working directory if present
    /// 3. Reads environment variables with `WAYPOINT` prefix, which win over the file
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `WAYPOINT__ROUTER__METRICS_CAPACITY=50000` -> `router.metrics_capacity = 50000`
    /// - `WAYPOINT__SERVER__LOG_FORMAT=json` -> `server.log_format = json`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::build(config::File::with_name(DEFAULT_FILE).required(false))
    }

    /// Load configuration from an explicit file plus the environment
    ///
    /// The file must exist; its format is taken from the extension.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::build(config::File::from(path.as_ref()).required(true))
    }

    fn build(file: config::File<config::FileSourceFile, config::FileFormat>) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .prefix_separator("__")
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
        self.router.validate()?;
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
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "WAYPOINT__ROUTER__METRICS_CAPACITY",
        "WAYPOINT__ROUTER__HEALTH_SWEEP_ENABLED",
        "WAYPOINT__ROUTER__ADAPTIVE__LATENCY",
        "WAYPOINT__SERVER__ENVIRONMENT",
        "WAYPOINT__SERVER__LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.router.metrics_capacity, 100_000);
        assert!(config.router.health_sweep_enabled);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WAYPOINT__ROUTER__METRICS_CAPACITY", "5000");
        env::set_var("WAYPOINT__ROUTER__HEALTH_SWEEP_ENABLED", "false");
        env::set_var("WAYPOINT__ROUTER__ADAPTIVE__LATENCY", "0.5");
        env::set_var("WAYPOINT__SERVER__LOG_FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.router.metrics_capacity, 5000);
        assert!(!config.router.health_sweep_enabled);
        assert_eq!(config.router.adaptive.latency, 0.5);
        assert_eq!(config.router.adaptive.weight, 0.3);
        assert_eq!(config.server.log_format, LogFormat::Json);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WAYPOINT__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_environment_overrides_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[router]\nmetrics_capacity = 42\nstats_window_secs = 60\n\n[server]\nenvironment = \"staging\""
        )
        .unwrap();

        env::set_var("WAYPOINT__ROUTER__METRICS_CAPACITY", "77");
        let result = AppConfig::load_from(file.path());
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.router.metrics_capacity, 77);
        assert_eq!(config.router.stats_window_secs, 60);
        assert_eq!(config.server.environment, Environment::Staging);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from(dir.path().join("absent.toml")).is_err());
    }
}
