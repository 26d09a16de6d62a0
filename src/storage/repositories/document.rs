//! Document CRUD, paginated queries, bulk writes, aggregation and import.

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Collection, Database};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;
use utoipa::ToSchema;

use super::{timed, validate_collection_name};
use crate::errors::{Error, Result};
use crate::storage::convert::{bson_to_json, document_to_json, parse_document_id};

/// Query parameters for [`DocumentRepository::find_page`]
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub filter: Document,
    pub sort: Option<Document>,
    pub projection: Option<Document>,
    pub skip: u64,
    pub limit: i64,
}

/// One page of documents plus the number of documents matching the filter
#[derive(Debug, Clone, Default)]
pub struct DocumentPage {
    pub total: u64,
    pub documents: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneSummary {
    #[schema(value_type = Object)]
    pub inserted_id: Value,
    #[schema(value_type = Object)]
    pub document: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertManySummary {
    #[schema(value_type = Vec<Object>)]
    pub inserted_ids: Vec<Value>,
    pub inserted_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: u64,
}

/// Outcome of an upsert import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub inserted_count: u64,
    pub upserted_count: u64,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Repository for document-level operations on any collection
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    database: Database,
}

impl DocumentRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Count matching documents and fetch the requested page
    #[instrument(
        skip(self, options),
        fields(collection = %name, skip = options.skip, limit = options.limit),
        name = "db_find_page"
    )]
    pub async fn find_page(&self, name: &str, options: FindOptions) -> Result<DocumentPage> {
        let collection = self.handle(name)?;
        let FindOptions { filter, sort, projection, skip, limit } = options;

        let total =
            timed("count_documents", name, collection.count_documents(filter.clone())).await?;

        let mut find = collection.find(filter).skip(skip).limit(limit);
        if let Some(sort) = sort.filter(|s| !s.is_empty()) {
            find = find.sort(sort);
        }
        if let Some(projection) = projection.filter(|p| !p.is_empty()) {
            find = find.projection(projection);
        }

        let documents = timed("find", name, async {
            let cursor = find.await?;
            cursor.try_collect::<Vec<Document>>().await
        })
        .await?;

        Ok(DocumentPage { total, documents: documents.into_iter().map(document_to_json).collect() })
    }

    /// First `limit` documents in natural order
    #[instrument(skip(self), fields(collection = %name), name = "db_sample_documents")]
    pub async fn sample(&self, name: &str, limit: i64) -> Result<Vec<Map<String, Value>>> {
        let collection = self.handle(name)?;
        let documents = timed("find", name, async {
            collection.find(doc! {}).limit(limit).await?.try_collect::<Vec<Document>>().await
        })
        .await?;

        Ok(documents.into_iter().map(document_to_json).collect())
    }

    /// Any one document, used to guess field shapes for searches
    pub async fn first(&self, name: &str) -> Result<Option<Map<String, Value>>> {
        let collection = self.handle(name)?;
        let document = timed("find_one", name, collection.find_one(doc! {})).await?;
        Ok(document.map(document_to_json))
    }

    /// Every document of the collection, for export
    #[instrument(skip(self), fields(collection = %name), name = "db_find_all")]
    pub async fn find_all(&self, name: &str) -> Result<Vec<Map<String, Value>>> {
        let collection = self.handle(name)?;
        let documents = timed("find", name, async {
            collection.find(doc! {}).await?.try_collect::<Vec<Document>>().await
        })
        .await?;

        Ok(documents.into_iter().map(document_to_json).collect())
    }

    #[instrument(skip(self), fields(collection = %name, id = %id), name = "db_find_by_id")]
    pub async fn find_by_id(&self, name: &str, id: &str) -> Result<Option<Map<String, Value>>> {
        let collection = self.handle(name)?;
        let filter = doc! { "_id": parse_document_id(id) };
        let document = timed("find_one", name, collection.find_one(filter)).await?;
        Ok(document.map(document_to_json))
    }

    /// Insert one document; the returned copy carries the assigned `_id`
    #[instrument(skip(self, document), fields(collection = %name), name = "db_insert_one")]
    pub async fn insert_one(&self, name: &str, document: Document) -> Result<InsertOneSummary> {
        let collection = self.handle(name)?;
        let result = timed("insert_one", name, collection.insert_one(&document)).await?;

        let mut stored = document;
        if !stored.contains_key("_id") {
            stored.insert("_id", result.inserted_id.clone());
        }

        Ok(InsertOneSummary {
            inserted_id: bson_to_json(result.inserted_id),
            document: document_to_json(stored),
        })
    }

    /// Insert several documents; ids are reported in input order
    #[instrument(
        skip(self, documents),
        fields(collection = %name, count = documents.len()),
        name = "db_insert_many"
    )]
    pub async fn insert_many(
        &self,
        name: &str,
        documents: Vec<Document>,
    ) -> Result<InsertManySummary> {
        if documents.is_empty() {
            return Err(Error::validation("Documents must be a non-empty array"));
        }

        let collection = self.handle(name)?;
        let result = timed("insert_many", name, collection.insert_many(documents)).await?;

        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);

        Ok(InsertManySummary {
            inserted_count: ids.len() as u64,
            inserted_ids: ids.into_iter().map(|(_, id)| bson_to_json(id)).collect(),
        })
    }

    /// `$set` the given fields on one document; `_id` is never rewritten
    #[instrument(
        skip(self, update),
        fields(collection = %name, id = %id),
        name = "db_update_by_id"
    )]
    pub async fn update_by_id(
        &self,
        name: &str,
        id: &str,
        mut update: Document,
    ) -> Result<UpdateSummary> {
        update.remove("_id");
        if update.is_empty() {
            return Err(Error::validation("Update must contain at least one field besides _id"));
        }

        let collection = self.handle(name)?;
        let filter = doc! { "_id": parse_document_id(id) };
        let result =
            timed("update_one", name, collection.update_one(filter, doc! { "$set": update }))
                .await?;

        if result.matched_count == 0 {
            return Err(Error::not_found("Document not found"));
        }

        Ok(UpdateSummary {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    #[instrument(skip(self), fields(collection = %name, id = %id), name = "db_delete_by_id")]
    pub async fn delete_by_id(&self, name: &str, id: &str) -> Result<DeleteSummary> {
        let collection = self.handle(name)?;
        let filter = doc! { "_id": parse_document_id(id) };
        let result = timed("delete_one", name, collection.delete_one(filter)).await?;

        if result.deleted_count == 0 {
            return Err(Error::not_found("Document not found"));
        }

        Ok(DeleteSummary { deleted_count: result.deleted_count })
    }

    /// `$set` the given fields on every document matching `filter`
    #[instrument(skip(self, filter, update), fields(collection = %name), name = "db_update_many")]
    pub async fn update_many(
        &self,
        name: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateSummary> {
        if update.is_empty() {
            return Err(Error::validation("Update must contain at least one field"));
        }

        let collection = self.handle(name)?;
        let result =
            timed("update_many", name, collection.update_many(filter, doc! { "$set": update }))
                .await?;

        tracing::info!(
            collection = %name,
            matched = result.matched_count,
            modified = result.modified_count,
            "Bulk update completed"
        );

        Ok(UpdateSummary {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    #[instrument(skip(self, filter), fields(collection = %name), name = "db_delete_many")]
    pub async fn delete_many(&self, name: &str, filter: Document) -> Result<DeleteSummary> {
        let collection = self.handle(name)?;
        let result = timed("delete_many", name, collection.delete_many(filter)).await?;

        tracing::info!(collection = %name, deleted = result.deleted_count, "Bulk delete completed");

        Ok(DeleteSummary { deleted_count: result.deleted_count })
    }

    /// Upsert documents by `_id`; documents without an `_id` are inserted
    #[instrument(
        skip(self, documents),
        fields(collection = %name, count = documents.len()),
        name = "db_upsert_many"
    )]
    pub async fn upsert_many(&self, name: &str, documents: Vec<Document>) -> Result<ImportSummary> {
        let collection = self.handle(name)?;
        let mut summary = ImportSummary::default();
        let mut fresh = Vec::new();

        for mut document in documents {
            let Some(id) = document.remove("_id") else {
                fresh.push(document);
                continue;
            };

            let update = if document.is_empty() {
                doc! { "$setOnInsert": { "_id": id.clone() } }
            } else {
                doc! { "$set": document }
            };

            let result = timed(
                "update_one",
                name,
                collection.update_one(doc! { "_id": id }, update).upsert(true),
            )
            .await?;

            if result.upserted_id.is_some() {
                summary.upserted_count += 1;
            } else {
                summary.matched_count += result.matched_count;
                summary.modified_count += result.modified_count;
            }
        }

        if !fresh.is_empty() {
            let result = timed("insert_many", name, collection.insert_many(fresh)).await?;
            summary.inserted_count = result.inserted_ids.len() as u64;
        }

        Ok(summary)
    }

    /// Run an aggregation pipeline and collect every output document
    #[instrument(
        skip(self, pipeline),
        fields(collection = %name, stages = pipeline.len()),
        name = "db_aggregate"
    )]
    pub async fn aggregate(
        &self,
        name: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Map<String, Value>>> {
        let collection = self.handle(name)?;
        let documents = timed("aggregate", name, async {
            collection.aggregate(pipeline).await?.try_collect::<Vec<Document>>().await
        })
        .await?;

        Ok(documents.into_iter().map(document_to_json).collect())
    }

    pub async fn count(&self, name: &str) -> Result<u64> {
        let collection = self.handle(name)?;
        timed("count_documents", name, collection.count_documents(doc! {})).await
    }

    fn handle(&self, name: &str) -> Result<Collection<Document>> {
        validate_collection_name(name)?;
        Ok(self.database.collection::<Document>(name))
    }
}

#[async_trait::async_trait]
impl crate::services::DocumentSource for DocumentRepository {
    async fn sample_documents(
        &self,
        collection: &str,
        limit: i64,
    ) -> Result<Vec<Map<String, Value>>> {
        self.sample(collection, limit).await
    }

    async fn count_documents(&self, collection: &str) -> Result<u64> {
        self.count(collection).await
    }
}
