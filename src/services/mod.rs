//! Business logic services
//!
//! Service layer components that sit between the HTTP handlers and the
//! repositories: schema inference, search filters, export rendering and
//! database snapshots.

pub mod schema_service;
pub mod search;
pub mod snapshot;
pub mod transfer;

pub use schema_service::{CollectionSchema, DocumentSource, SchemaService};
pub use search::{build_search_filter, SearchType};
pub use snapshot::{snapshot_database, CollectionSnapshot, DatabaseSnapshot};
pub use transfer::{render_csv, render_json, ExportFormat, ImportMode, EMPTY_EXPORT};
