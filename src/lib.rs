//! # mongorest
//!
//! A REST façade over a single MongoDB database. Every collection is exposed
//! through JSON endpoints for CRUD, bulk writes, search, aggregation, index
//! management and import/export. A schema-inference engine samples documents
//! and reports the top-level fields and value types it finds.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (axum) → handlers → services (schema, search, transfer) → storage (mongodb)
//!                                  ↓
//!                      schema inference (pure, no I/O)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mongorest::{api::{start_api_server, ApiState}, storage::MongoStore, Config, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!     let store = MongoStore::connect(&config.database).await?;
//!     let state = ApiState::new(store, config.schema.clone());
//!     start_api_server(config.api, state).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod schema;
pub mod services;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
