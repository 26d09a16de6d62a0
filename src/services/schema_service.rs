//! Schema inference for live collections
//!
//! Wraps [`infer_schema`] with the I/O it deliberately avoids: fetching a bounded
//! sample and the collection's true document count from a [`DocumentSource`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::SchemaConfig;
use crate::errors::Result;
use crate::observability::MetricsRecorder;
use crate::schema::{infer_schema, Document, SchemaReport};

/// Trait for reading documents to infer schemas from
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch up to `limit` documents in the collection's natural order
    async fn sample_documents(&self, collection: &str, limit: i64) -> Result<Vec<Document>>;

    /// Count every document in the collection
    async fn count_documents(&self, collection: &str) -> Result<u64>;
}

/// Result of inferring a collection's schema
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionSchema {
    /// The sample came back empty; no count was taken
    Empty,
    Inferred(SchemaReport),
}

/// Service that samples collections and summarizes their field types
#[derive(Clone)]
pub struct SchemaService {
    source: Arc<dyn DocumentSource>,
    config: SchemaConfig,
}

impl SchemaService {
    pub fn new(source: Arc<dyn DocumentSource>, config: SchemaConfig) -> Self {
        Self { source, config }
    }

    /// Infer the schema of `collection` from a sample of `requested` documents,
    /// clamped to the configured bounds.
    #[instrument(skip(self), fields(collection = %collection), name = "infer_collection_schema")]
    pub async fn infer(
        &self,
        collection: &str,
        requested: Option<i64>,
    ) -> Result<CollectionSchema> {
        let limit = self.config.sample_size(requested);
        let sample = self.source.sample_documents(collection, limit).await?;

        MetricsRecorder::new().record_schema_sample(sample.len() as u64);

        if sample.is_empty() {
            debug!(collection = %collection, "Empty sample, skipping inference");
            return Ok(CollectionSchema::Empty);
        }

        let total = self.source.count_documents(collection).await?;
        let report = infer_schema(&sample, total);

        debug!(
            collection = %collection,
            sample_size = report.sample_size,
            total_documents = total,
            fields = report.schema.len(),
            "Schema inferred"
        );

        Ok(CollectionSchema::Inferred(report))
    }
}

impl std::fmt::Debug for SchemaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaService").field("config", &self.config).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::schema::TypeTag;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory collections that record every call made against them
    #[derive(Default)]
    struct MemorySource {
        collections: HashMap<String, Vec<Document>>,
        limits: Mutex<Vec<i64>>,
        counts: Mutex<u32>,
    }

    impl MemorySource {
        fn with(name: &str, documents: Vec<serde_json::Value>) -> Self {
            let documents = documents
                .into_iter()
                .filter_map(|value| match value {
                    serde_json::Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();

            let mut collections = HashMap::new();
            collections.insert(name.to_string(), documents);
            Self { collections, ..Default::default() }
        }
    }

    #[async_trait]
    impl DocumentSource for MemorySource {
        async fn sample_documents(&self, collection: &str, limit: i64) -> Result<Vec<Document>> {
            self.limits.lock().unwrap().push(limit);
            let documents = self.collections.get(collection).cloned().unwrap_or_default();
            Ok(documents.into_iter().take(limit as usize).collect())
        }

        async fn count_documents(&self, collection: &str) -> Result<u64> {
            *self.counts.lock().unwrap() += 1;
            self.collections
                .get(collection)
                .map(|documents| documents.len() as u64)
                .ok_or_else(|| Error::not_found(format!("Collection '{}' not found", collection)))
        }
    }

    fn service(source: Arc<MemorySource>) -> SchemaService {
        SchemaService::new(source, SchemaConfig { default_sample_size: 2, max_sample_size: 3 })
    }

    #[tokio::test]
    async fn test_empty_collection_skips_count() {
        let source = Arc::new(MemorySource::default());
        let result = service(source.clone()).infer("missing", None).await.unwrap();

        assert_eq!(result, CollectionSchema::Empty);
        assert_eq!(*source.counts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sample_bounded_but_total_is_true_count() {
        let source = Arc::new(MemorySource::with(
            "people",
            vec![json!({"a": 1}), json!({"a": "x"}), json!({"a": [1]}), json!({"b": true})],
        ));

        let CollectionSchema::Inferred(report) =
            service(source.clone()).infer("people", None).await.unwrap()
        else {
            panic!("expected an inferred schema");
        };

        assert_eq!(report.sample_size, 2);
        assert_eq!(report.total_documents, 4);
        let field = report.field("a").unwrap();
        assert_eq!(
            field.types.iter().copied().collect::<Vec<_>>(),
            vec![TypeTag::Number, TypeTag::String]
        );
        assert!(report.field("b").is_none());
    }

    #[tokio::test]
    async fn test_requested_sample_size_is_clamped() {
        let source = Arc::new(MemorySource::with("people", vec![json!({"a": 1})]));
        let schema = service(source.clone());

        schema.infer("people", Some(50)).await.unwrap();
        schema.infer("people", Some(0)).await.unwrap();
        schema.infer("people", Some(-4)).await.unwrap();

        assert_eq!(*source.limits.lock().unwrap(), vec![3, 1, 1]);
    }

    #[tokio::test]
    async fn test_default_sample_size_used_without_override() {
        let source = Arc::new(MemorySource::with("people", vec![json!({"a": 1})]));
        let schema = service(source.clone());

        schema.infer("people", None).await.unwrap();

        assert_eq!(*source.limits.lock().unwrap(), vec![2]);
    }
}
