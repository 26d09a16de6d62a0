//! # Structured Logging
//!
//! Subscriber setup and span macros built on the `tracing` ecosystem.
//!
//! In JSON mode every event carries the fields of its enclosing spans, so a
//! `request_id` set by [`request_span!`] can be used to correlate all log lines
//! produced while serving one HTTP request.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Create a tracing span for request tracking.
///
/// ```rust,ignore
/// let span = request_span!("GET", "/api/collections");
/// let span = request_span!("GET", "/api/collections/users", collection = "users");
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for MongoDB operations.
///
/// ```rust,ignore
/// let span = db_span!("count_documents", collection = "users");
/// ```
#[macro_export]
macro_rules! db_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global tracing subscriber.
///
/// `log_level` accepts anything `EnvFilter` understands, e.g. `info` or
/// `mongorest=debug,mongodb=warn`.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        api_address = %config.api.socket_address(),
        database = %config.database.database_name,
        cors_origins = config.api.cors_origins.len(),
        schema_sample_size = config.schema.default_sample_size,
        metrics_enabled = %config.observability.enable_metrics,
        json_logging = %config.observability.json_logging,
        "mongorest configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = request_span!("GET", "/api/collections");
        let _span = request_span!("GET", "/api/collections/users", collection = "users");
        let _span = db_span!("count_documents");
        let _span = db_span!("find", collection = "users", limit = 10);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let config = ObservabilityConfig {
            log_level: "mongorest=notalevel".to_string(),
            ..Default::default()
        };
        assert!(matches!(init_logging(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_log_config_info() {
        let config = crate::config::AppConfig::default();

        // This should not panic
        log_config_info(&config);
    }
}
