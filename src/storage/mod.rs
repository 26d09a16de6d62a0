//! # Storage and Persistence
//!
//! MongoDB access for the REST façade: client setup, BSON/JSON conversion and
//! repositories for collections, documents and indexes.

pub mod client;
pub mod convert;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use client::{DatabaseSummary, MongoStore};
pub use repositories::{
    validate_collection_name, CollectionDetail, CollectionRepository, CollectionStats,
    CollectionSummary, DatabaseStats, DeleteSummary, DocumentPage, DocumentRepository,
    FindOptions, ImportSummary, IndexRepository, InsertManySummary, InsertOneSummary,
    UpdateSummary,
};
