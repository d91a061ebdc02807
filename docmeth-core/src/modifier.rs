//! Reusable cursor modifiers.
//!
//! A modifier is any `FnOnce(&mut ResultCursor)`. The factories here wrap a single cursor
//! mutator each (plus [`paginate`], which applies two) and can be handed to
//! [`ops::all_op`](crate::ops::all_op) or [`ops::one_op`](crate::ops::one_op). Callers are
//! free to pass their own closures instead.
//!
//! ```ignore
//! use docmeth::{modifier, ops};
//!
//! let mut rows: Vec<Birthday> = Vec::new();
//! ops::all_op(&Birthday::default(), modifier::sort(["-born"]), &mut rows, []).await?;
//!
//! // anything goes, as long as it only touches the cursor
//! ops::all_op(&Birthday::default(), |cursor: &mut ResultCursor| {
//!     cursor.sort(["name"]).limit(2);
//! }, &mut rows, []).await?;
//! ```

use crate::{cursor::ResultCursor, query::Expr};

/// Caps the number of rows returned.
pub fn limit(limit: usize) -> impl Fn(&mut ResultCursor) + Clone + Send + Sync {
    move |cursor: &mut ResultCursor| {
        cursor.limit(limit);
    }
}

/// Ignores the first `skip` rows.
pub fn skip(skip: usize) -> impl Fn(&mut ResultCursor) + Clone + Send + Sync {
    move |cursor: &mut ResultCursor| {
        cursor.skip(skip);
    }
}

/// Orders rows by the given field names. A field prefixed with a minus sign (`-`) sorts in
/// descending order; ascending order is used otherwise.
pub fn sort<I, S>(keys: I) -> impl Fn(&mut ResultCursor) + Clone + Send + Sync
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys = keys.into_iter().map(Into::into).collect::<Vec<String>>();

    move |cursor: &mut ResultCursor| {
        cursor.sort(&keys);
    }
}

/// Restricts which fields are filled in on returned rows.
pub fn select<I, S>(fields: I) -> impl Fn(&mut ResultCursor) + Clone + Send + Sync
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields = fields.into_iter().map(Into::into).collect::<Vec<String>>();

    move |cursor: &mut ResultCursor| {
        cursor.select(fields.iter().cloned());
    }
}

/// Discards the initial filtering conditions and sets new ones.
pub fn filter(conditions: impl IntoIterator<Item = Expr>) -> impl Fn(&mut ResultCursor) + Clone + Send + Sync {
    let conditions = conditions.into_iter().collect::<Vec<Expr>>();

    move |cursor: &mut ResultCursor| {
        cursor.filter(conditions.iter().cloned());
    }
}

/// Groups rows that have the same value in the given field or fields.
pub fn group<I, S>(fields: I) -> impl Fn(&mut ResultCursor) + Clone + Send + Sync
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields = fields.into_iter().map(Into::into).collect::<Vec<String>>();

    move |cursor: &mut ResultCursor| {
        cursor.group(fields.iter().cloned());
    }
}

/// Applies a limit and a skip in one step.
pub fn paginate(limit: usize, skip: usize) -> impl Fn(&mut ResultCursor) + Clone + Send + Sync {
    move |cursor: &mut ResultCursor| {
        cursor.limit(limit).skip(skip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collection::Collection,
        query::{Filter, Sort},
    };
    use async_trait::async_trait;
    use bson::Bson;

    use crate::{backend::StoreBackend, error::StoreResult, query::Query};

    #[derive(Debug)]
    struct NullBackend;

    #[async_trait]
    impl StoreBackend for NullBackend {
        async fn insert_documents(&self, _documents: Vec<Bson>, _collection: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn query_documents(&self, _query: Query, _collection: &str) -> StoreResult<Vec<Bson>> {
            Ok(vec![])
        }

        async fn count_documents(&self, _query: Query, _collection: &str) -> StoreResult<u64> {
            Ok(0)
        }

        async fn create_collection(&self, _name: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn drop_collection(&self, _name: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn list_collections(&self) -> StoreResult<Vec<String>> {
            Ok(vec![])
        }
    }

    fn cursor() -> ResultCursor {
        Collection::new("birthdays", NullBackend).find([Filter::eq("id", 1)])
    }

    #[test]
    fn paginate_sets_limit_and_skip() {
        let mut cursor = cursor();
        paginate(1, 1)(&mut cursor);

        assert_eq!(cursor.query().limit, Some(1));
        assert_eq!(cursor.query().skip, Some(1));
    }

    #[test]
    fn sort_parses_direction_prefix() {
        let mut cursor = cursor();
        sort(["-born", "name"])(&mut cursor);

        assert_eq!(cursor.query().sort, vec![Sort::desc("born"), Sort::asc("name")]);
    }

    #[test]
    fn filter_replaces_initial_conditions() {
        let mut cursor = cursor();
        filter([Filter::gt("id", 2)])(&mut cursor);

        assert_eq!(cursor.query().filter, Some(Filter::gt("id", 2)));
    }

    #[test]
    fn modifiers_are_reusable() {
        let modifier = group(["born"]);
        let (mut first, mut second) = (cursor(), cursor());

        modifier(&mut first);
        modifier(&mut second);

        assert_eq!(first.query().group, vec!["born".to_string()]);
        assert_eq!(first.query(), second.query());
    }

    #[test]
    fn select_and_limit_leave_filter_alone() {
        let mut cursor = cursor();
        select(["name"])(&mut cursor);
        limit(5)(&mut cursor);
        skip(2)(&mut cursor);

        assert_eq!(cursor.query().select, vec!["name".to_string()]);
        assert_eq!(cursor.query().limit, Some(5));
        assert_eq!(cursor.query().skip, Some(2));
        assert_eq!(cursor.query().filter, Some(Filter::eq("id", 1)));
    }
}
