//! # Configuration Management
//!
//! Environment-driven configuration for the MongoDB REST façade. Values are read
//! after `.env` is loaded (see `main.rs`) and validated with the `validator` crate
//! before any connection is attempted.

pub mod settings;

pub use settings::{
    ApiServerConfig, AppConfig, DatabaseConfig, ObservabilityConfig, SchemaConfig,
};

/// Application configuration alias used throughout the crate
pub type Config = AppConfig;
