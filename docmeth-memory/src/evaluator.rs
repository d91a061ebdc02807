//! Condition evaluation and row ordering for the in-memory backend.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, Document, datetime::DateTime};

use docmeth_core::{
    query::{QueryVisitor, Expr, FieldOp, Sort, SortDirection},
    error::{StoreError, StoreResult},
};


/// Comparable view of a BSON value. Integer widths are widened to `i64` so that an
/// `Int32` stored value equals an `Int64` condition value; doubles stay `f64` and only
/// meet integers through a lossless comparison.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(&'a str),
    DateTime(DateTime),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Integer(i64::from(*value)),
            Bson::Int64(value) => Comparable::Integer(*value),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null,
        }
    }
}

impl<'a> Comparable<'a> {
    /// Reads `field` from a row; a missing field reads as null.
    pub(crate) fn of_field(document: &'a Document, field: &str) -> Self {
        document
            .get(field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Bool(_) => 1,
            Comparable::Integer(_) | Comparable::Number(_) => 2,
            Comparable::String(_) => 3,
            Comparable::DateTime(_) => 4,
            Comparable::Array(_) => 5,
            Comparable::Map(_) => 6,
        }
    }

    /// Total order used for sorting: values of different kinds order by kind
    /// (null first), arrays and maps compare equal among themselves.
    pub(crate) fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.cmp(b),
            (Comparable::Integer(a), Comparable::Integer(b)) => a.cmp(b),
            // NaN sorts after every number
            (Comparable::Number(a), Comparable::Number(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            },
            (Comparable::Integer(a), Comparable::Number(b)) => {
                integer_cmp_double(*a, *b).unwrap_or(Ordering::Less)
            }
            (Comparable::Number(a), Comparable::Integer(b)) => {
                integer_cmp_double(*b, *a).map_or(Ordering::Greater, Ordering::reverse)
            }
            (Comparable::String(a), Comparable::String(b)) => a.cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Integer(a), Comparable::Integer(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::Integer(a), Comparable::Number(b))
            | (Comparable::Number(b), Comparable::Integer(a)) => {
                integer_cmp_double(*a, *b) == Some(Ordering::Equal)
            }
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Integer(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Number(b)) => integer_cmp_double(*a, *b),
            (Comparable::Number(a), Comparable::Integer(b)) => {
                integer_cmp_double(*b, *a).map(Ordering::reverse)
            }
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Compares an integer with a double without rounding the integer. `None` for NaN.
fn integer_cmp_double(integer: i64, double: f64) -> Option<Ordering> {
    if double.is_nan() {
        return None;
    }

    // i64 spans [-2^63, 2^63); doubles outside it order trivially
    if double >= 9_223_372_036_854_775_808.0 {
        return Some(Ordering::Less);
    }
    if double < -9_223_372_036_854_775_808.0 {
        return Some(Ordering::Greater);
    }

    let truncated = double.trunc();
    match integer.cmp(&(truncated as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(double - truncated)),
        ordering => Some(ordering),
    }
}

/// Orders two rows by a list of sort keys, most significant first.
pub(crate) fn compare_rows(left: &Document, right: &Document, keys: &[Sort]) -> Ordering {
    keys
        .iter()
        .map(|key| {
            let ordering = Comparable::of_field(left, &key.field)
                .total_cmp(&Comparable::of_field(right, &key.field));

            match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}


/// Evaluates a condition against one row.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> StoreResult<bool> {
        self.visit_expr(expr)
    }

    /// Keeps the rows matching `expr`, preserving their order.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        expr: &Expr,
    ) -> StoreResult<Vec<Document>> {
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).evaluate(expr)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.document.contains_key(field) == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(field) else {
            return Ok(false);
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(value);

        Ok(match op {
            FieldOp::Eq => left == right,
            FieldOp::Ne => left != right,
            FieldOp::Gt => left.partial_cmp(&right) == Some(Ordering::Greater),
            FieldOp::Gte => matches!(left.partial_cmp(&right), Some(Ordering::Greater | Ordering::Equal)),
            FieldOp::Lt => left.partial_cmp(&right) == Some(Ordering::Less),
            FieldOp::Lte => matches!(left.partial_cmp(&right), Some(Ordering::Less | Ordering::Equal)),
            FieldOp::Contains => match (&left, &right) {
                (Comparable::Array(items), _) => items.iter().any(|item| item == &right),
                (Comparable::String(haystack), Comparable::String(needle)) => haystack.contains(*needle),
                _ => false,
            },
            FieldOp::StartsWith => match (&left, &right) {
                (Comparable::String(text), Comparable::String(prefix)) => text.starts_with(*prefix),
                _ => false,
            },
            FieldOp::AnyOf => match &right {
                Comparable::Array(candidates) => candidates.iter().any(|candidate| candidate == &left),
                _ => {
                    return Err(StoreError::InvalidQuery(format!("`{field}` any_of expects an array")));
                }
            },
            FieldOp::NoneOf => match &right {
                Comparable::Array(candidates) => !candidates.iter().any(|candidate| candidate == &left),
                _ => {
                    return Err(StoreError::InvalidQuery(format!("`{field}` none_of expects an array")));
                }
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use docmeth_core::query::Filter;

    fn row() -> Document {
        doc! { "id": 2_i32, "name": "Linus Torvalds", "tags": ["kernel", "git"] }
    }

    fn eval(expr: Expr) -> bool {
        DocumentEvaluator::new(&row()).evaluate(&expr).unwrap()
    }

    #[test]
    fn numbers_compare_across_widths() {
        assert!(eval(Filter::eq("id", 2_i64)));
        assert!(eval(Filter::lte("id", 2.0)));
        assert!(!eval(Filter::gt("id", 2_i64)));
    }

    #[test]
    fn large_integers_compare_exactly() {
        let row = doc! { "id": 9_007_199_254_740_992_i64 };
        let eval = |expr: Expr| DocumentEvaluator::new(&row).evaluate(&expr).unwrap();

        assert!(eval(Filter::eq("id", 9_007_199_254_740_992_i64)));
        assert!(!eval(Filter::eq("id", 9_007_199_254_740_993_i64)));
        assert!(eval(Filter::lt("id", 9_007_199_254_740_993_i64)));
        assert!(eval(Filter::gt("id", 9_007_199_254_740_991.0)));
        assert!(eval(Filter::eq("id", 9_007_199_254_740_992.0)));
        assert!(!eval(Filter::eq("id", f64::NAN)));
    }

    #[test]
    fn missing_field_never_matches_comparisons() {
        assert!(!eval(Filter::eq("born", "1969")));
        assert!(eval(Filter::not_exists("born")));
        assert!(eval(Filter::eq("born", "1969").not()));
    }

    #[test]
    fn string_and_array_operators() {
        assert!(eval(Filter::contains("name", "Torv")));
        assert!(eval(Filter::contains("tags", "git")));
        assert!(eval(Filter::starts_with("name", "Linus")));
        assert!(eval(Filter::any_of("id", vec![1_i32, 2])));
        assert!(eval(Filter::none_of("id", vec![1_i32, 3])));
    }

    #[test]
    fn membership_needs_an_array() {
        let result = DocumentEvaluator::new(&row()).evaluate(&Filter::any_of("id", 2));

        assert!(matches!(result, Err(StoreError::InvalidQuery(_))));
    }

    #[test]
    fn rows_order_by_successive_keys() {
        let a = doc! { "born": "1969", "name": "b" };
        let b = doc! { "born": "1969", "name": "a" };
        let keys = [Sort::desc("born"), Sort::asc("name")];

        assert_eq!(compare_rows(&a, &b, &keys), Ordering::Greater);
        assert_eq!(compare_rows(&a, &doc! { "name": "z" }, &keys), Ordering::Less);
    }
}
