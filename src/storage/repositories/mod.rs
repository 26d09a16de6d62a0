//! Repository modules for data access
//!
//! Each repository wraps a [`mongodb::Database`] handle and covers one group of
//! operations: collection management, document CRUD and querying, indexes.

pub mod collection;
pub mod document;
pub mod index;

pub use collection::{
    CollectionDetail, CollectionRepository, CollectionStats, CollectionSummary, DatabaseStats,
};
pub use document::{
    DeleteSummary, DocumentPage, DocumentRepository, FindOptions, ImportSummary, InsertManySummary,
    InsertOneSummary, UpdateSummary,
};
pub use index::IndexRepository;

use std::future::IntoFuture;
use std::time::Instant;

use tracing::Instrument;

use crate::errors::{Error, Result};
use crate::observability::MetricsRecorder;

/// Reject collection names the server would refuse or that address internals.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("Collection name is required"));
    }

    if name.contains('$') || name.contains('\0') {
        return Err(Error::validation(format!(
            "Invalid collection name '{}': must not contain '$' or null characters",
            name.replace('\0', "\\0")
        )));
    }

    if name.starts_with("system.") {
        return Err(Error::validation(format!(
            "Invalid collection name '{}': the 'system.' prefix is reserved",
            name
        )));
    }

    Ok(())
}

/// Await a driver action inside a `db_span!`, recording its latency and outcome.
pub(crate) async fn timed<T, A>(operation: &'static str, collection: &str, action: A) -> Result<T>
where
    A: IntoFuture<Output = mongodb::error::Result<T>>,
{
    let span = crate::db_span!(operation, collection = %collection);
    let start = Instant::now();

    let result = action.into_future().instrument(span).await;
    MetricsRecorder::new().record_db_operation(
        operation,
        start.elapsed().as_secs_f64(),
        result.is_ok(),
    );

    result.map_err(|e| {
        tracing::error!(
            error = %e,
            operation,
            collection = %collection,
            "MongoDB operation failed"
        );
        Error::database(e, format!("{} on '{}' failed", operation, collection))
    })
}
