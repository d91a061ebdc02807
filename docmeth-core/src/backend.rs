//! Storage backend abstraction.
//!
//! A [`StoreBackend`] is the collaborator that actually runs queries. This crate never
//! plans or executes a query itself; [`Collection`](crate::collection::Collection) and
//! [`ResultCursor`](crate::cursor::ResultCursor) only describe the request and pass it on.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances

use async_trait::async_trait;
use bson::Bson;
use std::{fmt::Debug, sync::Arc};

use crate::{error::StoreResult, query::Query};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Collection handles share one backend through an
/// `Arc`, so any interior state needs its own synchronization.
///
/// # Error Handling
///
/// Whatever error a backend returns reaches the caller of the lookup helpers unchanged.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Appends documents to a collection, creating the collection when missing.
    ///
    /// # Arguments
    ///
    /// * `documents` - BSON documents to store, in the order they should be kept
    /// * `collection` - The name of the collection to insert into
    async fn insert_documents(&self, documents: Vec<Bson>, collection: &str) -> StoreResult<()>;

    /// Runs a query and returns the matching documents.
    ///
    /// Documents come back in storage order unless the query carries sort keys. The
    /// backend applies, in order: filter, group, sort, skip, limit, projection.
    ///
    /// # Arguments
    ///
    /// * `query` - The [`Query`] to execute
    /// * `collection` - The name of the collection to query
    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>>;

    /// Counts the documents (or groups, for grouped queries) matching a query.
    ///
    /// Limit, skip, sort and projection do not influence the count.
    async fn count_documents(&self, query: Query, collection: &str) -> StoreResult<u64>;

    /// Creates an empty collection. Creating an existing collection is not an error.
    async fn create_collection(&self, name: &str) -> StoreResult<()>;

    /// Drops a collection and all its documents.
    ///
    /// # Warning
    ///
    /// This operation is irreversible.
    async fn drop_collection(&self, name: &str) -> StoreResult<()>;

    /// Lists the names of all collections in the store.
    async fn list_collections(&self) -> StoreResult<Vec<String>>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn insert_documents(&self, documents: Vec<Bson>, collection: &str) -> StoreResult<()> {
        (*self)
            .insert_documents(documents, collection)
            .await
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>> {
        (*self)
            .query_documents(query, collection)
            .await
    }

    async fn count_documents(&self, query: Query, collection: &str) -> StoreResult<u64> {
        (*self)
            .count_documents(query, collection)
            .await
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        (*self).create_collection(name).await
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        (*self).drop_collection(name).await
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        (*self).list_collections().await
    }
}

#[async_trait]
impl<B> StoreBackend for Arc<B>
where
    B: StoreBackend + ?Sized,
{
    async fn insert_documents(&self, documents: Vec<Bson>, collection: &str) -> StoreResult<()> {
        (**self)
            .insert_documents(documents, collection)
            .await
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>> {
        (**self)
            .query_documents(query, collection)
            .await
    }

    async fn count_documents(&self, query: Query, collection: &str) -> StoreResult<u64> {
        (**self)
            .count_documents(query, collection)
            .await
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        (**self).create_collection(name).await
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        (**self).drop_collection(name).await
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        (**self).list_collections().await
    }
}

/// Factory for backends that need asynchronous setup (connecting, seeding, ...).
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
