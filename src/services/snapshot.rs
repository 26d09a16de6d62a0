//! Whole-database snapshots for offline inspection.
//!
//! Small collections are captured completely; larger ones contribute a bounded
//! sample next to their true document count.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::storage::MongoStore;

/// Collections with at most this many documents are captured completely
pub const FULL_SNAPSHOT_LIMIT: u64 = 100;

/// Documents kept from collections above [`FULL_SNAPSHOT_LIMIT`]
pub const SNAPSHOT_SAMPLE_SIZE: i64 = 50;

/// Captured contents of one collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot {
    pub total_documents: u64,
    pub sample_size: usize,
    pub sample_documents: Vec<Map<String, Value>>,
}

/// Collection name to snapshot, in collection-name order
pub type DatabaseSnapshot = IndexMap<String, CollectionSnapshot>;

/// How many documents to read from a collection of `count` documents;
/// `None` reads all of them.
pub fn snapshot_limit(count: u64) -> Option<i64> {
    if count <= FULL_SNAPSHOT_LIMIT {
        None
    } else {
        Some(SNAPSHOT_SAMPLE_SIZE)
    }
}

/// Capture every collection of the exposed database
pub async fn snapshot_database(store: &MongoStore) -> Result<DatabaseSnapshot> {
    let collections = store.collections();
    let documents = store.documents();
    let mut snapshot = DatabaseSnapshot::new();

    for name in collections.list_names().await? {
        let total_documents = collections.count(&name).await?;
        let sample_documents = match snapshot_limit(total_documents) {
            None => documents.find_all(&name).await?,
            Some(limit) => documents.sample(&name, limit).await?,
        };

        tracing::info!(
            collection = %name,
            total_documents,
            captured = sample_documents.len(),
            "Collection captured"
        );

        snapshot.insert(
            name,
            CollectionSnapshot {
                total_documents,
                sample_size: sample_documents.len(),
                sample_documents,
            },
        );
    }

    Ok(snapshot)
}
