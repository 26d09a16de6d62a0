//! HTTP handlers for the REST API, grouped by resource.

pub mod aggregation;
pub mod bulk;
pub mod collections;
pub mod database;
pub mod documents;
pub mod health;
pub mod indexes;
pub mod pagination;
pub mod schema;
pub mod search;
pub mod transfer;

pub use aggregation::aggregate_handler;
pub use bulk::{bulk_delete_handler, bulk_insert_handler, bulk_update_handler};
pub use collections::{
    collection_stats_handler, create_collection_handler, drop_collection_handler,
    list_collections_handler, rename_collection_handler, MessageResponse,
};
pub use database::database_stats_handler;
pub use documents::{
    create_document_handler, delete_document_handler, get_document_handler,
    list_documents_handler, update_document_handler,
};
pub use health::{health_handler, readiness_handler};
pub use indexes::{create_index_handler, drop_index_handler, list_indexes_handler};
pub use schema::schema_handler;
pub use search::{query_handler, search_handler};
pub use transfer::{export_handler, import_handler};
