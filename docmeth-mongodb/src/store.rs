use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, Bson};
use mongodb::{
    Client, Collection as MongoCollection,
    options::ClientOptions,
};
use tracing::trace;
use docmeth_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    query::Query,
};

use crate::query::{
    MongoQueryTranslator, find_options, grouped_pipeline, grouped_count_pipeline, returns_nothing,
};


fn backend_error(error: mongodb::error::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn prepare_document(document: Bson, collection: &str) -> StoreResult<Document> {
        match document {
            Bson::Document(document) => Ok(document),
            other => Err(StoreError::InvalidDocument(format!(
                "expected a document in collection {collection}, got {other}"
            ))),
        }
    }

    /// Strips the server-assigned `_id` so rows deserialize into plain records.
    fn restore_document(mut document: Document) -> Bson {
        document.remove("_id");
        Bson::Document(document)
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_documents(&self, documents: Vec<Bson>, collection: &str) -> StoreResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        self.get_collection(collection)
            .insert_many(
                documents
                    .into_iter()
                    .map(|document| Self::prepare_document(document, collection))
                    .collect::<StoreResult<Vec<Document>>>()?,
            )
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>> {
        if returns_nothing(&query) {
            trace!(collection, "mongodb query capped at zero rows");
            return Ok(vec![]);
        }

        let rows = if query.group.is_empty() {
            self.get_collection(collection)
                .find(MongoQueryTranslator::filter(query.filter.as_ref())?)
                .with_options(find_options(&query))
                .await
                .map_err(backend_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(backend_error)?
        } else {
            self.get_collection(collection)
                .aggregate(grouped_pipeline(&query)?)
                .await
                .map_err(backend_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(backend_error)?
        };

        trace!(collection, rows = rows.len(), grouped = !query.group.is_empty(), "mongodb query");

        Ok(rows.into_iter().map(Self::restore_document).collect())
    }

    async fn count_documents(&self, query: Query, collection: &str) -> StoreResult<u64> {
        if query.group.is_empty() {
            return self.get_collection(collection)
                .count_documents(MongoQueryTranslator::filter(query.filter.as_ref())?)
                .await
                .map_err(backend_error);
        }

        let counted = self.get_collection(collection)
            .aggregate(grouped_count_pipeline(&query)?)
            .await
            .map_err(backend_error)?
            .try_next()
            .await
            .map_err(backend_error)?;

        // $count emits nothing when no group matched
        Ok(match counted.as_ref().and_then(|row| row.get("count")) {
            Some(Bson::Int32(count)) => *count as u64,
            Some(Bson::Int64(count)) => *count as u64,
            _ => 0,
        })
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        if self.list_collections().await?.iter().any(|existing| existing == name) {
            return Ok(());
        }

        self.client
            .database(&self.database)
            .create_collection(name)
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        self.get_collection(name)
            .drop()
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        let mut names = self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(backend_error)?;

        names.sort();

        Ok(names)
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| StoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn restored_rows_drop_server_ids() {
        let restored = MongoDbStore::restore_document(doc! { "_id": 7, "id": 1, "name": "Jonathan Ive" });

        assert_eq!(restored, Bson::Document(doc! { "id": 1, "name": "Jonathan Ive" }));
    }

    #[test]
    fn only_documents_can_be_stored() {
        assert!(matches!(
            MongoDbStore::prepare_document(Bson::String("x".into()), "birthdays"),
            Err(StoreError::InvalidDocument(_)),
        ));
    }
}
