//! Collection handles.
//!
//! A [`Collection`] pairs a collection name with a shared backend. It is what
//! [`Persistent::collection`](crate::record::Persistent::collection) hands out, and the
//! starting point of every query through [`Collection::find`].
//!
//! # Example
//!
//! ```ignore
//! use docmeth::{collection::Collection, memory::InMemoryStore, query::Filter};
//!
//! let birthdays = Collection::new("birthdays", InMemoryStore::new());
//! let cursor = birthdays.find([Filter::eq("name", "Linus Torvalds")]);
//! ```

use bson::ser::serialize_to_bson;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    backend::StoreBackend,
    cursor::ResultCursor,
    error::StoreResult,
    query::{Expr, Query},
};

/// A named collection on a shared storage backend.
///
/// Cloning is cheap: clones share the same backend.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    backend: Arc<dyn StoreBackend>,
}

impl Collection {
    /// Creates a handle for `name` on the given backend.
    pub fn new(name: impl Into<String>, backend: impl StoreBackend + 'static) -> Self {
        Self::from_shared(name, Arc::new(backend))
    }

    /// Creates a handle from an already shared backend.
    pub fn from_shared(name: impl Into<String>, backend: Arc<dyn StoreBackend>) -> Self {
        Self { name: name.into(), backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the backend this collection lives on.
    pub fn backend(&self) -> &dyn StoreBackend {
        &*self.backend
    }

    /// Starts a query. Several conditions are combined with AND; no conditions match every
    /// document in the collection.
    pub fn find(&self, conditions: impl IntoIterator<Item = Expr>) -> ResultCursor {
        ResultCursor::new(self.clone(), Query::matching(conditions))
    }

    /// Serializes records and appends them to the collection.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if serialization or insertion fails.
    pub async fn insert<R>(&self, records: impl IntoIterator<Item = R>) -> StoreResult<()>
    where
        R: Serialize,
    {
        let documents = records
            .into_iter()
            .map(|record| serialize_to_bson(&record))
            .collect::<Result<Vec<_>, _>>()?;

        self.backend
            .insert_documents(documents, &self.name)
            .await
    }
}
