//! Collection management: listing, creation, drop, rename and statistics.

use futures::future::try_join_all;
use mongodb::bson::{doc, Document};
use mongodb::Database;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use super::{timed, validate_collection_name};
use crate::errors::{Error, Result};
use crate::storage::convert::{bson_as_i64, document_to_json};

/// Collection name with its document count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CollectionSummary {
    pub name: String,
    pub count: u64,
}

/// Digest of the `collStats` command for one collection
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub collection: String,
    pub count: u64,
    pub size: i64,
    pub storage_size: i64,
    pub avg_obj_size: i64,
    pub index_count: i64,
    pub total_index_size: i64,
}

/// Per-collection entry of [`DatabaseStats`]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CollectionDetail {
    pub name: String,
    pub count: u64,
    /// Size in bytes; estimated from one document when `collStats` is unavailable
    pub size: i64,
    pub indexes: u64,
}

/// Database-wide totals
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub database: String,
    pub collections: u64,
    pub total_documents: u64,
    pub total_size: i64,
    pub total_indexes: u64,
    pub collections_details: Vec<CollectionDetail>,
}

/// Repository for collection-level operations
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    database: Database,
    admin: Database,
}

impl CollectionRepository {
    pub fn new(database: Database, admin: Database) -> Self {
        Self { database, admin }
    }

    /// Collection names in alphabetical order
    #[instrument(skip(self), name = "db_list_collection_names")]
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let mut names =
            timed("list_collections", self.database.name(), self.database.list_collection_names())
                .await?;
        names.sort();
        Ok(names)
    }

    /// Whether a collection with this exact name exists
    #[instrument(skip(self), fields(collection = %name), name = "db_collection_exists")]
    pub async fn exists(&self, name: &str) -> Result<bool> {
        validate_collection_name(name)?;
        let names = timed(
            "list_collections",
            name,
            self.database.list_collection_names().filter(doc! { "name": name }),
        )
        .await?;
        Ok(names.iter().any(|existing| existing == name))
    }

    /// Every collection with its document count
    #[instrument(skip(self), name = "db_list_collections")]
    pub async fn list_with_counts(&self) -> Result<Vec<CollectionSummary>> {
        let names = self.list_names().await?;
        try_join_all(names.into_iter().map(|name| async move {
            let count = self.count(&name).await?;
            Ok::<_, Error>(CollectionSummary { name, count })
        }))
        .await
    }

    /// Number of documents in a collection
    pub async fn count(&self, name: &str) -> Result<u64> {
        validate_collection_name(name)?;
        timed("count_documents", name, self.handle(name).count_documents(doc! {})).await
    }

    /// Create a collection, forwarding driver options such as `capped` or `validator`
    #[instrument(skip(self, options), fields(collection = %name), name = "db_create_collection")]
    pub async fn create(&self, name: &str, options: Document) -> Result<()> {
        validate_collection_name(name)?;

        let mut command = doc! { "create": name };
        for (key, value) in options {
            if key != "create" {
                command.insert(key, value);
            }
        }

        timed("create_collection", name, self.database.run_command(command)).await?;
        tracing::info!(collection = %name, "Collection created");
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %name), name = "db_drop_collection")]
    pub async fn drop(&self, name: &str) -> Result<()> {
        validate_collection_name(name)?;
        if !self.exists(name).await? {
            return Err(Error::not_found(format!("Collection '{}' not found", name)));
        }

        timed("drop_collection", name, self.handle(name).drop()).await?;
        tracing::info!(collection = %name, "Collection dropped");
        Ok(())
    }

    /// Rename within the exposed database; fails if the target already exists
    #[instrument(
        skip(self),
        fields(collection = %name, new_name = %new_name),
        name = "db_rename_collection"
    )]
    pub async fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        validate_collection_name(name)?;
        validate_collection_name(new_name)?;

        let database = self.database.name();
        let command = doc! {
            "renameCollection": format!("{}.{}", database, name),
            "to": format!("{}.{}", database, new_name),
            "dropTarget": false,
        };

        timed("rename_collection", name, self.admin.run_command(command)).await?;
        tracing::info!(collection = %name, new_name = %new_name, "Collection renamed");
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %name), name = "db_collection_stats")]
    pub async fn stats(&self, name: &str) -> Result<CollectionStats> {
        validate_collection_name(name)?;

        let stats = self.coll_stats(name).await?;
        let count = self.count(name).await?;
        let field = |key: &str| stats.get(key).and_then(bson_as_i64).unwrap_or(0);

        Ok(CollectionStats {
            collection: name.to_string(),
            count,
            size: field("size"),
            storage_size: field("storageSize"),
            avg_obj_size: field("avgObjSize"),
            index_count: field("nindexes"),
            total_index_size: field("totalIndexSize"),
        })
    }

    /// Totals across every collection of the database
    #[instrument(skip(self), name = "db_database_stats")]
    pub async fn database_stats(&self) -> Result<DatabaseStats> {
        let names = self.list_names().await?;
        let details = try_join_all(names.iter().map(|name| self.detail(name))).await?;

        Ok(DatabaseStats {
            database: self.database.name().to_string(),
            collections: details.len() as u64,
            total_documents: details.iter().map(|d| d.count).sum(),
            total_size: details.iter().map(|d| d.size).sum(),
            total_indexes: details.iter().map(|d| d.indexes).sum(),
            collections_details: details,
        })
    }

    async fn detail(&self, name: &str) -> Result<CollectionDetail> {
        let count = self.count(name).await?;

        let size = match self.coll_stats(name).await {
            Ok(stats) => stats
                .get("size")
                .and_then(bson_as_i64)
                .filter(|size| *size > 0)
                .or_else(|| stats.get("storageSize").and_then(bson_as_i64))
                .unwrap_or(0),
            Err(e) => {
                tracing::warn!(
                    collection = %name,
                    error = %e,
                    "collStats unavailable, estimating size"
                );
                self.estimate_size(name, count).await
            }
        };

        let indexes = match timed("list_indexes", name, self.handle(name).list_index_names()).await
        {
            Ok(names) => names.len() as u64,
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Could not list indexes");
                0
            }
        };

        Ok(CollectionDetail { name: name.to_string(), count, size, indexes })
    }

    /// JSON length of one document multiplied by the document count
    async fn estimate_size(&self, name: &str, count: u64) -> i64 {
        if count == 0 {
            return 0;
        }

        match timed("find_one", name, self.handle(name).find_one(doc! {})).await {
            Ok(Some(document)) => {
                let encoded = serde_json::Value::Object(document_to_json(document)).to_string();
                (encoded.len() as i64).saturating_mul(count as i64)
            }
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(
                    collection = %name,
                    error = %e,
                    "Could not estimate collection size"
                );
                0
            }
        }
    }

    async fn coll_stats(&self, name: &str) -> Result<Document> {
        timed("coll_stats", name, self.database.run_command(doc! { "collStats": name })).await
    }

    fn handle(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(name)
    }
}
