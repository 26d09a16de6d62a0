//! Index listing, creation and removal.

use mongodb::bson::{self, doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use serde_json::Value;
use tracing::instrument;

use super::{timed, validate_collection_name};
use crate::errors::{Error, Result};
use crate::storage::convert::bson_to_json;

/// Repository for index operations
#[derive(Debug, Clone)]
pub struct IndexRepository {
    database: Database,
}

impl IndexRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Index specifications as reported by `listIndexes`
    #[instrument(skip(self), fields(collection = %name), name = "db_list_indexes")]
    pub async fn list(&self, name: &str) -> Result<Vec<Value>> {
        validate_collection_name(name)?;

        let reply =
            timed("list_indexes", name, self.database.run_command(doc! { "listIndexes": name }))
                .await?;

        let batch = reply
            .get_document("cursor")
            .and_then(|cursor| cursor.get_array("firstBatch"))
            .map_err(|e| Error::internal(format!("Unexpected listIndexes reply: {}", e)))?;

        Ok(batch.iter().cloned().map(bson_to_json).collect())
    }

    /// Create an index and return the name the server assigned
    #[instrument(skip(self, keys, options), fields(collection = %name), name = "db_create_index")]
    pub async fn create(&self, name: &str, keys: Document, options: Document) -> Result<String> {
        validate_collection_name(name)?;

        if keys.is_empty() {
            return Err(Error::validation("Index keys are required"));
        }

        let options = if options.is_empty() {
            None
        } else {
            Some(bson::from_document::<IndexOptions>(options).map_err(|e| {
                Error::validation(format!("Invalid index options: {}", e))
            })?)
        };

        let model = IndexModel::builder().keys(keys).options(options).build();
        let collection = self.database.collection::<Document>(name);
        let result = timed("create_index", name, collection.create_index(model)).await?;

        tracing::info!(collection = %name, index = %result.index_name, "Index created");
        Ok(result.index_name)
    }

    #[instrument(
        skip(self),
        fields(collection = %name, index = %index_name),
        name = "db_drop_index"
    )]
    pub async fn drop(&self, name: &str, index_name: &str) -> Result<()> {
        validate_collection_name(name)?;

        if index_name == "_id_" {
            return Err(Error::validation("The _id index cannot be dropped"));
        }

        let collection = self.database.collection::<Document>(name);
        timed("drop_index", name, collection.drop_index(index_name)).await?;

        tracing::info!(collection = %name, index = %index_name, "Index dropped");
        Ok(())
    }
}
