//! In-memory storage implementation.
//!
//! Rows live in per-collection vectors, so unsorted queries return them in insertion
//! order. All access goes through an async-aware read-write lock.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document};
use tracing::trace;

use docmeth_core::{
    query::Query,
    record::ID_FIELD,
    error::{StoreError, StoreResult},
    backend::{StoreBackend, StoreBackendBuilder},
};

use crate::evaluator::{DocumentEvaluator, Comparable, compare_rows};

type StoreMap = HashMap<String, Vec<Document>>;


/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so clones share
/// the same data. Queries scan the whole collection; there are no indexes.
///
/// # Example
///
/// ```ignore
/// use docmeth_memory::InMemoryStore;
/// use docmeth::backend::StoreBackend;
/// use bson::{Bson, doc};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     store
///         .insert_documents(vec![Bson::Document(doc! { "id": 1, "name": "Alice" })], "users")
///         .await?;
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> rows in insertion order
    store: Arc<RwLock<StoreMap>>,
    /// Whether reading a missing collection is an error rather than an empty result
    strict_collections: bool,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
            strict_collections: false,
        }
    }

    /// Creates a builder for an `InMemoryStore` with custom options.
    ///
    /// ```ignore
    /// let store = InMemoryStore::builder()
    ///     .strict_collections(true)
    ///     .collection("birthdays")
    ///     .build()
    ///     .await?;
    /// ```
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    fn missing_collection(&self, collection: &str) -> StoreResult<Vec<Document>> {
        if self.strict_collections {
            Err(StoreError::CollectionNotFound(collection.to_string()))
        } else {
            Ok(vec![])
        }
    }

    /// Filters and groups rows; shared by queries and counts.
    fn matching_rows(rows: &[Document], query: &Query) -> StoreResult<Vec<Document>> {
        let matched = match &query.filter {
            Some(filter) => DocumentEvaluator::filter_documents(rows, filter)?,
            None => rows.to_vec(),
        };

        Ok(group_rows(matched, &query.group))
    }
}

/// Keeps the first row of every distinct combination of `fields`.
fn group_rows(rows: Vec<Document>, fields: &[String]) -> Vec<Document> {
    if fields.is_empty() {
        return rows;
    }

    let mut kept: Vec<Document> = Vec::new();

    for row in rows {
        let seen = kept.iter().any(|existing| {
            fields
                .iter()
                .all(|field| Comparable::of_field(existing, field) == Comparable::of_field(&row, field))
        });

        if !seen {
            kept.push(row);
        }
    }

    kept
}

/// Keeps only the selected fields, in selection order.
fn project(row: Document, fields: &[String]) -> Document {
    if fields.is_empty() {
        return row;
    }

    fields
        .iter()
        .filter_map(|field| row.get(field).map(|value| (field.clone(), value.clone())))
        .collect()
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_documents(&self, documents: Vec<Bson>, collection: &str) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let existing = store
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default();

        // Nothing is stored unless the whole batch is valid
        let mut batch: Vec<Document> = Vec::with_capacity(documents.len());

        for document in documents {
            let Bson::Document(document) = document else {
                return Err(StoreError::InvalidDocument(format!(
                    "expected a document in collection {collection}, got {document}"
                )));
            };

            if let Some(id) = document.get(ID_FIELD) {
                let taken = existing
                    .iter()
                    .chain(batch.iter())
                    .any(|row| Comparable::of_field(row, ID_FIELD) == Comparable::from(id));

                if taken {
                    return Err(StoreError::DocumentAlreadyExists(id.to_string(), collection.to_string()));
                }
            }

            batch.push(document);
        }

        store
            .entry(collection.to_string())
            .or_default()
            .extend(batch);

        Ok(())
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let Some(rows) = store.get(collection) else {
            return Ok(self
                .missing_collection(collection)?
                .into_iter()
                .map(Bson::Document)
                .collect());
        };

        let mut rows = Self::matching_rows(rows, &query)?;

        // Stable, so equal keys keep storage order
        if !query.sort.is_empty() {
            rows.sort_by(|left, right| compare_rows(left, right, &query.sort));
        }

        let rows = rows
            .into_iter()
            .skip(query.skip.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|row| Bson::Document(project(row, &query.select)))
            .collect::<Vec<_>>();

        trace!(collection, rows = rows.len(), "in-memory query");

        Ok(rows)
    }

    async fn count_documents(&self, query: Query, collection: &str) -> StoreResult<u64> {
        let store = self.store.read().await;
        let Some(rows) = store.get(collection) else {
            return Ok(self.missing_collection(collection)?.len() as u64);
        };

        Ok(Self::matching_rows(rows, &query)?.len() as u64)
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        let mut store = self.store.write().await;

        if store.remove(name).is_none() {
            return Err(StoreError::CollectionNotFound(name.to_string()));
        }

        Ok(())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        let mut names = self.store
            .read()
            .await
            .keys()
            .cloned()
            .collect::<Vec<_>>();

        names.sort();

        Ok(names)
    }
}


/// Builder for [`InMemoryStore`] instances.
#[derive(Default, Debug)]
pub struct InMemoryStoreBuilder {
    strict_collections: bool,
    collections: Vec<String>,
}

impl InMemoryStoreBuilder {
    /// When enabled, querying or counting a collection that was never created fails with
    /// [`StoreError::CollectionNotFound`] instead of returning nothing.
    pub fn strict_collections(mut self, strict: bool) -> Self {
        self.strict_collections = strict;
        self
    }

    /// Creates an empty collection when the store is built.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collections.push(name.into());
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let store = InMemoryStore {
            strict_collections: self.strict_collections,
            ..InMemoryStore::new()
        };

        for name in &self.collections {
            store.create_collection(name).await?;
        }

        Ok(store)
    }
}
