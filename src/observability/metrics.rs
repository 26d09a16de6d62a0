//! # Metrics Collection
//!
//! Prometheus metrics for HTTP traffic and MongoDB calls.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use ::tracing::info;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Metrics recorder that tracks application metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record an HTTP request
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration: f64) {
        counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "path" => path.to_string(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .record(duration);
    }

    /// Record a MongoDB operation with execution timing
    pub fn record_db_operation(&self, operation: &str, duration: f64, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!(
            "db_operations_total",
            "operation" => operation.to_string(),
            "status" => status
        )
        .increment(1);

        histogram!("db_operation_duration_seconds", "operation" => operation.to_string())
            .record(duration);
    }

    /// Record the size of a schema sample
    pub fn record_schema_sample(&self, sample_size: u64) {
        histogram!("schema_sample_documents").record(sample_size as f64);
    }

    fn describe(&self) {
        describe_counter!("http_requests_total", Unit::Count, "HTTP requests served");
        describe_histogram!(
            "http_request_duration_seconds",
            Unit::Seconds,
            "HTTP request latency"
        );
        describe_counter!("db_operations_total", Unit::Count, "MongoDB operations issued");
        describe_histogram!(
            "db_operation_duration_seconds",
            Unit::Seconds,
            "MongoDB operation latency"
        );
        describe_histogram!(
            "schema_sample_documents",
            Unit::Count,
            "Documents sampled per schema inference"
        );
    }
}

/// Install the Prometheus exporter when metrics are enabled.
///
/// Without an installed recorder the `metrics` macros are no-ops, so callers
/// can record unconditionally.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    let metrics_addr = match config.metrics_bind_address() {
        Some(addr) => addr,
        None => return Ok(()),
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        Error::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name)
        .install()
        .map_err(|e| Error::config(format!("Failed to initialize metrics exporter: {}", e)))?;

    MetricsRecorder::new().describe();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Prometheus metrics exporter started"
    );

    Ok(())
}
