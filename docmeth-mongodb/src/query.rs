//! Query translation from docmeth conditions to MongoDB query syntax.
//!
//! Ungrouped queries run as a plain `find` with options; grouped queries need an
//! aggregation pipeline so that only the first row of every group survives.

use bson::{Document, Bson, doc};
use mongodb::options::FindOptions;

use docmeth_core::{
    query::{QueryVisitor, Expr, FieldOp, Query, Sort, SortDirection},
    error::{StoreError, StoreResult},
};


/// Translates condition expressions into MongoDB filter documents.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Filter document for an optional condition; `None` matches everything.
    pub(crate) fn filter(expr: Option<&Expr>) -> StoreResult<Document> {
        match expr {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    // $not only applies to operator expressions, $nor negates a whole filter
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$nor": [self.visit_expr(expr)?],
        })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Contains => match value {
                    Bson::String(s) => doc! { "$regex": escape_regex(s) },
                    other => doc! { "$elemMatch": { "$eq": other } },
                },
                FieldOp::StartsWith => match value {
                    Bson::String(s) => doc! { "$regex": format!("^{}", escape_regex(s)) },
                    _ => return Err(StoreError::InvalidQuery(format!("`{field}` starts_with expects a string"))),
                },
                FieldOp::AnyOf => match value {
                    Bson::Array(values) => doc! { "$in": values },
                    _ => return Err(StoreError::InvalidQuery(format!("`{field}` any_of expects an array"))),
                },
                FieldOp::NoneOf => match value {
                    Bson::Array(values) => doc! { "$nin": values },
                    _ => return Err(StoreError::InvalidQuery(format!("`{field}` none_of expects an array"))),
                },
            }
        })
    }
}

/// Escapes regex metacharacters so substring matches are literal.
fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

fn sort_document(keys: &[Sort]) -> Option<Document> {
    if keys.is_empty() {
        return None;
    }

    Some(
        keys
            .iter()
            .map(|key| {
                let direction = match key.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                };

                (key.field.clone(), Bson::Int32(direction))
            })
            .collect()
    )
}

/// Projection that keeps the selected fields and always hides `_id`.
fn projection(fields: &[String]) -> Option<Document> {
    if fields.is_empty() {
        return None;
    }

    let mut projection = doc! { "_id": 0 };
    for field in fields {
        projection.insert(field.clone(), 1);
    }

    Some(projection)
}

/// Whether the query is capped at zero rows. MongoDB reads a zero limit as "no limit"
/// (and rejects `$limit: 0`), so such queries must not reach the server.
pub(crate) fn returns_nothing(query: &Query) -> bool {
    query.limit == Some(0)
}

/// Options for an ungrouped `find`. A zero limit is left out; see [`returns_nothing`].
pub(crate) fn find_options(query: &Query) -> FindOptions {
    let mut options = FindOptions::default();

    options.limit = query.limit.filter(|limit| *limit > 0).map(|limit| limit as i64);
    options.skip = query.skip.map(|skip| skip as u64);
    options.sort = sort_document(&query.sort);
    options.projection = projection(&query.select);

    options
}

/// `$match` + `$group` + `$replaceRoot` stages keeping the first row per group.
fn grouping_stages(query: &Query) -> StoreResult<Vec<Document>> {
    let key = query
        .group
        .iter()
        .map(|field| (field.clone(), Bson::String(format!("${field}"))))
        .collect::<Document>();

    Ok(vec![
        doc! { "$match": MongoQueryTranslator::filter(query.filter.as_ref())? },
        doc! { "$group": { "_id": key, "doc": { "$first": "$$ROOT" } } },
        doc! { "$replaceRoot": { "newRoot": "$doc" } },
    ])
}

/// Full aggregation pipeline for a grouped query.
pub(crate) fn grouped_pipeline(query: &Query) -> StoreResult<Vec<Document>> {
    let mut pipeline = grouping_stages(query)?;

    // $group does not preserve order, sort on _id to keep results stable
    match sort_document(&query.sort) {
        Some(sort) => pipeline.push(doc! { "$sort": sort }),
        None => pipeline.push(doc! { "$sort": { "_id": 1 } }),
    }
    if let Some(skip) = query.skip {
        pipeline.push(doc! { "$skip": skip as i64 });
    }
    if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
        pipeline.push(doc! { "$limit": limit as i64 });
    }
    if let Some(projection) = projection(&query.select) {
        pipeline.push(doc! { "$project": projection });
    }

    Ok(pipeline)
}

/// Aggregation pipeline counting the groups of a grouped query.
pub(crate) fn grouped_count_pipeline(query: &Query) -> StoreResult<Vec<Document>> {
    let mut pipeline = grouping_stages(query)?;
    pipeline.push(doc! { "$count": "count" });

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmeth_core::query::Filter;

    #[test]
    fn conditions_translate_to_operators() {
        let filter = MongoQueryTranslator::filter(Some(&Filter::and([
            Filter::lte("id", 2_i64),
            Filter::starts_with("name", "J."),
        ])))
        .unwrap();

        assert_eq!(filter, doc! {
            "$and": [
                { "id": { "$lte": 2_i64 } },
                { "name": { "$regex": "^J\\." } },
            ],
        });
    }

    #[test]
    fn negation_uses_nor() {
        let filter = MongoQueryTranslator::filter(Some(&Filter::eq("id", 1).not())).unwrap();

        assert_eq!(filter, doc! { "$nor": [{ "id": { "$eq": 1 } }] });
    }

    #[test]
    fn membership_requires_arrays() {
        assert!(matches!(
            MongoQueryTranslator::filter(Some(&Filter::none_of("id", 1))),
            Err(StoreError::InvalidQuery(_)),
        ));
        assert_eq!(
            MongoQueryTranslator::filter(Some(&Filter::any_of("id", vec![1, 2]))).unwrap(),
            doc! { "id": { "$in": [1, 2] } },
        );
    }

    #[test]
    fn find_options_carry_paging_sort_and_projection() {
        let query = Query {
            limit: Some(2),
            skip: Some(1),
            sort: vec![Sort::desc("born"), Sort::asc("name")],
            select: vec!["name".to_string()],
            ..Query::default()
        };
        let options = find_options(&query);

        assert_eq!(options.limit, Some(2));
        assert_eq!(options.skip, Some(1));
        assert_eq!(options.sort, Some(doc! { "born": -1, "name": 1 }));
        assert_eq!(options.projection, Some(doc! { "_id": 0, "name": 1 }));
    }

    #[test]
    fn zero_limits_never_reach_the_server() {
        let query = Query { limit: Some(0), ..Query::default() };
        let grouped = Query { group: vec!["team".to_string()], ..query.clone() };

        assert!(returns_nothing(&query));
        assert!(!returns_nothing(&Query { limit: Some(1), ..Query::default() }));
        assert!(!returns_nothing(&Query::default()));

        assert_eq!(find_options(&query).limit, None);
        assert!(
            grouped_pipeline(&grouped)
                .unwrap()
                .iter()
                .all(|stage| !stage.contains_key("$limit"))
        );
    }

    #[test]
    fn grouped_queries_keep_first_row_per_key() {
        let query = Query {
            group: vec!["team".to_string()],
            limit: Some(5),
            ..Query::default()
        };

        assert_eq!(grouped_pipeline(&query).unwrap(), vec![
            doc! { "$match": {} },
            doc! { "$group": { "_id": { "team": "$team" }, "doc": { "$first": "$$ROOT" } } },
            doc! { "$replaceRoot": { "newRoot": "$doc" } },
            doc! { "$sort": { "_id": 1 } },
            doc! { "$limit": 5_i64 },
        ]);
        assert_eq!(
            grouped_count_pipeline(&query).unwrap().last(),
            Some(&doc! { "$count": "count" }),
        );
    }
}
