//! Pending result sets.
//!
//! A [`ResultCursor`] is a query that has not run yet. Mutators reshape it in place;
//! materializers consume it and ask the backend for rows, so a cursor is used for exactly
//! one fetch.

use bson::de::deserialize_from_bson;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::{
    collection::Collection,
    error::{StoreError, StoreResult},
    query::{Expr, Query, Sort},
};

/// A query in progress against one [`Collection`].
#[derive(Debug, Clone)]
pub struct ResultCursor {
    collection: Collection,
    query: Query,
}

impl ResultCursor {
    pub(crate) fn new(collection: Collection, query: Query) -> Self {
        Self { collection, query }
    }

    /// Returns the collection this cursor reads from.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Returns the query as it currently stands.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Caps the number of rows returned.
    pub fn limit(&mut self, limit: usize) -> &mut Self {
        self.query.limit = Some(limit);
        self
    }

    /// Discards the first `skip` rows.
    pub fn skip(&mut self, skip: usize) -> &mut Self {
        self.query.skip = Some(skip);
        self
    }

    /// Sets the sort keys. A `-` prefix sorts that field in descending order.
    pub fn sort<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.query.sort = keys
            .into_iter()
            .map(|key| Sort::parse(key.as_ref()))
            .collect();
        self
    }

    /// Restricts returned rows to the given fields.
    pub fn select<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.select = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the filtering conditions. The conditions given to
    /// [`Collection::find`] are discarded, not extended.
    pub fn filter(&mut self, conditions: impl IntoIterator<Item = Expr>) -> &mut Self {
        self.query.filter = Expr::conjunction(conditions);
        self
    }

    /// Collapses rows sharing the same values for `fields` into one.
    pub fn group<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.group = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Fetches the first row and deserializes it over `target`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DocumentNotFound`] if nothing matches
    /// - [`StoreError::Serialization`] if the row does not fit `T`
    /// - any error raised by the backend
    pub async fn one<T>(self, target: &mut T) -> StoreResult<()>
    where
        T: DeserializeOwned,
    {
        let Self { collection, mut query } = self;
        query.limit = Some(query.limit.map_or(1, |limit| limit.min(1)));

        let row = collection
            .backend()
            .query_documents(query, collection.name())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::DocumentNotFound(collection.name().to_string()))?;

        trace!(collection = collection.name(), "fetched one row");

        *target = deserialize_from_bson(row)?;

        Ok(())
    }

    /// Fetches every row and replaces the contents of `rows` with them.
    ///
    /// `rows` is left untouched when the backend or deserialization fails.
    pub async fn all<T>(self, rows: &mut Vec<T>) -> StoreResult<()>
    where
        T: DeserializeOwned,
    {
        let fetched = self
            .collection
            .backend()
            .query_documents(self.query, self.collection.name())
            .await?
            .into_iter()
            .map(deserialize_from_bson)
            .collect::<Result<Vec<T>, _>>()?;

        trace!(collection = self.collection.name(), rows = fetched.len(), "fetched rows");

        *rows = fetched;

        Ok(())
    }

    /// Counts matching rows (or groups). Limit, skip, sort and projection are ignored.
    pub async fn count(self) -> StoreResult<u64> {
        self.collection
            .backend()
            .count_documents(self.query, self.collection.name())
            .await
    }
}
