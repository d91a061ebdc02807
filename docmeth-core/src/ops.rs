//! Lookup shortcuts for [`Persistent`] records.
//!
//! Every function here is a short pass-through: build a condition, open a cursor on the
//! record's collection, optionally run a modifier, then fetch. Errors from the backend
//! are returned as-is. [`exists`] is the exception and never fails; use [`try_exists`]
//! to see what went wrong.
//!
//! # Example
//!
//! ```ignore
//! use docmeth::{ops, query::Filter};
//!
//! let mut birthday = Birthday { id: 1, ..Default::default() };
//! ops::one(&mut birthday).await?;
//! assert_eq!(birthday.name, "Jonathan Ive");
//!
//! let mut rows: Vec<Birthday> = Vec::new();
//! ops::all_by(&birthday, &mut rows, [Filter::lte("id", 2)]).await?;
//! ```

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    cursor::ResultCursor,
    error::StoreResult,
    query::{Expr, Filter},
    record::{ID_FIELD, Persistent},
};

/// Fills `record` with the stored row whose `id` equals the record's own identifier.
///
/// # Errors
///
/// Returns identifier resolution errors, [`StoreError::DocumentNotFound`] when no row has
/// that identifier, and anything the backend reports.
///
/// [`StoreError::DocumentNotFound`]: crate::error::StoreError::DocumentNotFound
pub async fn one<P: Persistent>(record: &mut P) -> StoreResult<()> {
    let id = record.identifier()?;
    let collection = record.collection();

    debug!(collection = collection.name(), id, "fetching record by id");

    collection
        .find([Filter::eq(ID_FIELD, id)])
        .one(record)
        .await
}

/// Fills `record` with the first row matching `conditions`.
pub async fn one_by<P: Persistent>(
    record: &mut P,
    conditions: impl IntoIterator<Item = Expr>,
) -> StoreResult<()> {
    let collection = record.collection();

    debug!(collection = collection.name(), "fetching record by conditions");

    collection
        .find(conditions)
        .one(record)
        .await
}

/// Replaces the contents of `rows` with every row matching `conditions`.
///
/// `record` is only used to reach its collection.
pub async fn all_by<P, T>(
    record: &P,
    rows: &mut Vec<T>,
    conditions: impl IntoIterator<Item = Expr>,
) -> StoreResult<()>
where
    P: Persistent,
    T: DeserializeOwned,
{
    let collection = record.collection();

    debug!(collection = collection.name(), "fetching records by conditions");

    collection
        .find(conditions)
        .all(rows)
        .await
}

/// Alias for [`all_by`].
pub async fn all<P, T>(
    record: &P,
    rows: &mut Vec<T>,
    conditions: impl IntoIterator<Item = Expr>,
) -> StoreResult<()>
where
    P: Persistent,
    T: DeserializeOwned,
{
    all_by(record, rows, conditions).await
}

/// Reports whether a row matches either `conditions` or, when none are given, the
/// record's identifier.
///
/// This never fails. An unresolvable identifier falls back to `id = 0`, and a backend
/// error counts as "does not exist". Both are logged at debug level.
pub async fn exists<P: Persistent>(record: &P, conditions: impl IntoIterator<Item = Expr>) -> bool {
    let conditions = conditions.into_iter().collect::<Vec<_>>();

    let conditions = if conditions.is_empty() {
        let id = record.identifier().unwrap_or_else(|err| {
            debug!(error = %err, "identifier unavailable, checking id = 0");
            0
        });

        vec![Filter::eq(ID_FIELD, id)]
    } else {
        conditions
    };

    record
        .collection()
        .find(conditions)
        .count()
        .await
        .unwrap_or_else(|err| {
            debug!(error = %err, "existence check failed, reporting missing");
            0
        })
        > 0
}

/// Like [`exists`], but returns identifier and backend errors instead of `false`.
pub async fn try_exists<P: Persistent>(
    record: &P,
    conditions: impl IntoIterator<Item = Expr>,
) -> StoreResult<bool> {
    let mut conditions = conditions.into_iter().collect::<Vec<_>>();

    if conditions.is_empty() {
        conditions.push(Filter::eq(ID_FIELD, record.identifier()?));
    }

    let count = record
        .collection()
        .find(conditions)
        .count()
        .await?;

    Ok(count > 0)
}

/// Works like [`all_by`] but runs `operation` on the cursor before fetching.
///
/// The conditions set the initial filter, then `operation` runs (and may replace that
/// filter), then every row is fetched into `rows`.
pub async fn all_op<P, T, F>(
    record: &P,
    operation: F,
    rows: &mut Vec<T>,
    conditions: impl IntoIterator<Item = Expr>,
) -> StoreResult<()>
where
    P: Persistent,
    T: DeserializeOwned,
    F: FnOnce(&mut ResultCursor),
{
    let mut cursor = record.collection().find(conditions);

    operation(&mut cursor);

    debug!(collection = cursor.collection().name(), query = ?cursor.query(), "fetching rows");

    cursor.all(rows).await
}

/// Works like [`all_op`] but fetches a single row into `row`.
pub async fn one_op<P, T, F>(
    record: &P,
    operation: F,
    row: &mut T,
    conditions: impl IntoIterator<Item = Expr>,
) -> StoreResult<()>
where
    P: Persistent,
    T: DeserializeOwned,
    F: FnOnce(&mut ResultCursor),
{
    let mut cursor = record.collection().find(conditions);

    operation(&mut cursor);

    debug!(collection = cursor.collection().name(), query = ?cursor.query(), "fetching row");

    cursor.one(row).await
}
