//! # Configuration Settings
//!
//! Defines the configuration structure for the MongoDB REST façade.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP API server configuration
    #[validate(nested)]
    pub api: ApiServerConfig,

    /// MongoDB connection configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Schema sampling configuration
    #[validate(nested)]
    pub schema: SchemaConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    ///
    /// Not validated yet: callers apply command-line overrides first and then
    /// call [`AppConfig::validate`].
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api: ApiServerConfig::from_env()?,
            database: DatabaseConfig::from_env(),
            schema: SchemaConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    /// Cross-field checks the validator derive cannot express
    fn validate_custom(&self) -> Result<()> {
        if !self.database.uri.starts_with("mongodb://")
            && !self.database.uri.starts_with("mongodb+srv://")
        {
            return Err(Error::validation(
                "MongoDB URI must start with 'mongodb://' or 'mongodb+srv://'",
            ));
        }

        if self.schema.default_sample_size > self.schema.max_sample_size {
            return Err(Error::validation(
                "Default schema sample size cannot exceed the maximum sample size",
            ));
        }

        if self.observability.enable_metrics && self.observability.metrics_port == self.api.port {
            return Err(Error::validation("API and metrics ports cannot be the same"));
        }

        Ok(())
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind_address: String,

    /// Server port
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// CORS allowed origins (empty = allow all)
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[validate(range(min = 1024, message = "Max body size must be at least 1KB"))]
    pub max_body_bytes: usize,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec![],
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ApiServerConfig {
    /// Create ApiServerConfig from environment variables
    ///
    /// `PORT` is honoured for compatibility with PaaS deployments; the
    /// prefixed variable wins when both are set.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("MONGOREST_API_PORT").or_else(|_| std::env::var("PORT")) {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|e| Error::config(format!("Invalid API port '{}': {}", value, e)))?,
            Err(_) => defaults.port,
        };

        let bind_address =
            std::env::var("MONGOREST_API_BIND_ADDRESS").unwrap_or(defaults.bind_address);

        let cors_origins = std::env::var("MONGOREST_CORS_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let max_body_bytes = std::env::var("MONGOREST_MAX_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_body_bytes);

        Ok(Self { bind_address, port, cors_origins, max_body_bytes })
    }

    /// Get the server bind address
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// MongoDB connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    #[validate(length(min = 1, message = "MongoDB URI cannot be empty"))]
    pub uri: String,

    /// Database exposed through the API
    #[validate(length(min = 1, max = 63, message = "Database name must be 1-63 characters"))]
    pub database_name: String,

    /// Driver connection pool size
    #[validate(range(
        min = 1,
        max = 500,
        message = "Max pool size must be between 1 and 500"
    ))]
    pub max_pool_size: u32,

    /// Server selection timeout in seconds
    #[validate(range(
        min = 1,
        max = 120,
        message = "Server selection timeout must be between 1 and 120 seconds"
    ))]
    pub server_selection_timeout_seconds: u64,

    /// Application name reported to the server
    pub app_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database_name: "test".to_string(),
            max_pool_size: 10,
            server_selection_timeout_seconds: 10,
            app_name: crate::APP_NAME.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Get server selection timeout as Duration
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_seconds)
    }

    /// Create DatabaseConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let uri = std::env::var("MONGODB_URI").unwrap_or(defaults.uri);
        let database_name = std::env::var("DATABASE_NAME").unwrap_or(defaults.database_name);

        let max_pool_size = std::env::var("MONGOREST_MAX_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_pool_size);

        let server_selection_timeout_seconds =
            std::env::var("MONGOREST_SERVER_SELECTION_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(defaults.server_selection_timeout_seconds);

        Self {
            uri,
            database_name,
            max_pool_size,
            server_selection_timeout_seconds,
            app_name: defaults.app_name,
        }
    }
}

/// Schema sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchemaConfig {
    /// Documents sampled when the request does not ask for a size
    #[validate(range(min = 1, message = "Default sample size must be at least 1"))]
    pub default_sample_size: i64,

    /// Upper bound for a requested sample size
    #[validate(range(
        min = 1,
        max = 100000,
        message = "Max sample size must be between 1 and 100000"
    ))]
    pub max_sample_size: i64,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { default_sample_size: 100, max_sample_size: 1000 }
    }
}

impl SchemaConfig {
    /// Create SchemaConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let default_sample_size = std::env::var("MONGOREST_SCHEMA_SAMPLE_SIZE")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(defaults.default_sample_size);

        let max_sample_size = std::env::var("MONGOREST_SCHEMA_MAX_SAMPLE_SIZE")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(defaults.max_sample_size);

        Self { default_sample_size, max_sample_size }
    }

    /// Resolve the sample size for a request, clamped to `[1, max_sample_size]`
    pub fn sample_size(&self, requested: Option<i64>) -> i64 {
        let max = self.max_sample_size.max(1);
        requested.unwrap_or(self.default_sample_size).clamp(1, max)
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Tracing filter directive (trace, debug, info, warn, error, or full EnvFilter syntax)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Enable the Prometheus metrics exporter
    pub enable_metrics: bool,

    /// Metrics exporter port
    #[validate(range(min = 1, max = 65535, message = "Metrics port must be between 1 and 65535"))]
    pub metrics_port: u16,

    /// Service name attached to metrics
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
            enable_metrics: false,
            metrics_port: 9090,
            service_name: crate::APP_NAME.to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let log_level = std::env::var("MONGOREST_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(defaults.log_level);

        let json_logging = std::env::var("MONGOREST_JSON_LOGS")
            .map(|s| parse_bool(&s))
            .unwrap_or(defaults.json_logging);

        let enable_metrics = std::env::var("MONGOREST_ENABLE_METRICS")
            .map(|s| parse_bool(&s))
            .unwrap_or(defaults.enable_metrics);

        let metrics_port = std::env::var("MONGOREST_METRICS_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.metrics_port);

        Self {
            log_level,
            json_logging,
            enable_metrics,
            metrics_port,
            service_name: defaults.service_name,
        }
    }

    /// Get metrics bind address (None if disabled)
    pub fn metrics_bind_address(&self) -> Option<String> {
        if self.enable_metrics {
            Some(format!("0.0.0.0:{}", self.metrics_port))
        } else {
            None
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_socket_address() {
        let config = ApiServerConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.socket_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_database_config_timeout() {
        let config = DatabaseConfig { server_selection_timeout_seconds: 5, ..Default::default() };
        assert_eq!(config.server_selection_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_schema_sample_size_resolution() {
        let config = SchemaConfig { default_sample_size: 100, max_sample_size: 500 };
        assert_eq!(config.sample_size(None), 100);
        assert_eq!(config.sample_size(Some(20)), 20);
        assert_eq!(config.sample_size(Some(10_000)), 500);
        assert_eq!(config.sample_size(Some(0)), 1);
        assert_eq!(config.sample_size(Some(-3)), 1);
    }

    #[test]
    fn test_sample_size_with_unvalidated_cap() {
        let config = SchemaConfig { default_sample_size: 100, max_sample_size: 0 };
        assert_eq!(config.sample_size(None), 1);
        assert_eq!(config.sample_size(Some(50)), 1);
    }

    #[test]
    fn test_metrics_bind_address() {
        let enabled = ObservabilityConfig { enable_metrics: true, ..Default::default() };
        assert_eq!(enabled.metrics_bind_address(), Some("0.0.0.0:9090".to_string()));

        let disabled = ObservabilityConfig::default();
        assert_eq!(disabled.metrics_bind_address(), None);
    }

    #[test]
    fn test_config_validation_errors() {
        // Non-MongoDB URI
        let mut config = AppConfig::default();
        config.database.uri = "postgresql://localhost/db".to_string();
        assert!(config.validate().is_err());

        // Default sample larger than the cap
        let mut config = AppConfig::default();
        config.schema.default_sample_size = 2000;
        assert!(config.validate().is_err());

        // Metrics exporter on the API port
        let mut config = AppConfig::default();
        config.observability.enable_metrics = true;
        config.observability.metrics_port = config.api.port;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_ranges() {
        let mut config = AppConfig::default();
        config.api.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.database_name = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.max_pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("ON"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));
    }
}
