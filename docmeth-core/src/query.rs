//! Conditions and the backend-facing query description.
//!
//! Conditions are [`Expr`] trees built through [`Filter`]. The wrapper never looks inside
//! them; it hands them to the backend inside a [`Query`], which also carries the state a
//! [`ResultCursor`](crate::cursor::ResultCursor) accumulates (limit, skip, sort, projection
//! and grouping).
//!
//! ```ignore
//! use docmeth::query::Filter;
//!
//! let born_before_1970 = Filter::lt("born", "1970-01-01T00:00:00Z");
//! let first_two = Filter::cond("id <=", 2)?;
//! ```

use bson::Bson;

use crate::error::{StoreError, StoreResult};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Ascending order on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Asc }
    }

    /// Descending order on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Desc }
    }

    /// Parses a sort key where a leading `-` means descending and a leading `+`
    /// (or no prefix) means ascending.
    pub fn parse(key: &str) -> Self {
        let key = key.trim();

        match key.strip_prefix('-') {
            Some(field) => Sort::desc(field),
            None => Sort::asc(key.strip_prefix('+').unwrap_or(key)),
        }
    }
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// String or array contains value.
    Contains,
    /// String starts with value.
    StartsWith,
    /// Field value is one of the given values.
    AnyOf,
    /// Field value is none of the given values.
    NoneOf,
}

impl FieldOp {
    /// Maps a comparison token such as `<=` or `!=` to an operator.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" | "==" => Some(FieldOp::Eq),
            "!=" | "<>" => Some(FieldOp::Ne),
            ">" => Some(FieldOp::Gt),
            ">=" => Some(FieldOp::Gte),
            "<" => Some(FieldOp::Lt),
            "<=" => Some(FieldOp::Lte),
            _ => None,
        }
    }
}

/// A condition understood by the storage backend.
///
/// Expressions can be combined using logical operators (`And`, `Or`, `Not`).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression.
    Not(Box<Expr>),
    /// Checks if a field exists or doesn't exist.
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        field: String,
        op: FieldOp,
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND, flattening nested ANDs.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR, flattening nested ORs.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression.
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Folds a list of conditions into one filter. Several conditions are joined with AND;
    /// an empty list means "match everything".
    pub fn conjunction(conditions: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        let mut conditions = conditions.into_iter().collect::<Vec<_>>();

        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Expr::And(conditions)),
        }
    }
}

/// Constructors for condition expressions.
///
/// All methods accept field names as `Into<String>` and values as `Into<Bson>`.
pub struct Filter;

impl Filter {
    /// Field equals value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Field differs from value.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    /// Field is greater than value.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Field is greater than or equal to value.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Field is less than value.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Field is less than or equal to value.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Matches string fields containing the value, or array fields holding it.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Contains, value.into())
    }

    /// String field begins with the value.
    pub fn starts_with(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::StartsWith, value.into())
    }

    /// Matches documents whose field equals any element of `values`.
    pub fn any_of(field: impl Into<String>, values: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::AnyOf, values.into())
    }

    /// Matches documents whose field equals no element of `values`.
    pub fn none_of(field: impl Into<String>, values: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::NoneOf, values.into())
    }

    /// Field is present, whatever its value.
    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), true)
    }

    /// Field is absent.
    pub fn not_exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), false)
    }

    /// All of `exprs` match.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// At least one of `exprs` matches.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }

    /// Builds a comparison from a `"field operator"` key, e.g. `"id <="` or `"name !="`.
    /// A key without an operator compares for equality.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuery`] when the key is empty or the operator is unknown.
    pub fn cond(key: &str, value: impl Into<Bson>) -> StoreResult<Expr> {
        let mut parts = key.split_whitespace();

        let field = parts
            .next()
            .ok_or_else(|| StoreError::InvalidQuery("empty condition key".to_string()))?;

        let op = match (parts.next(), parts.next()) {
            (None, _) => FieldOp::Eq,
            (Some(token), None) => FieldOp::from_token(token).ok_or_else(|| {
                StoreError::InvalidQuery(format!("unknown operator `{token}` in `{key}`"))
            })?,
            (Some(_), Some(_)) => {
                return Err(StoreError::InvalidQuery(format!("malformed condition key `{key}`")));
            }
        };

        Ok(Expr::field(field.to_string(), op, value.into()))
    }
}

/// Everything a backend needs to answer a pending request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Optional filter expression; `None` matches every document.
    pub filter: Option<Expr>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// Number of documents to skip.
    pub skip: Option<usize>,
    /// Sort keys, most significant first.
    pub sort: Vec<Sort>,
    /// Fields to keep in returned documents; empty keeps everything.
    pub select: Vec<String>,
    /// Fields whose distinct value tuples collapse rows into one.
    pub group: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a query filtered by the conjunction of `conditions`.
    pub fn matching(conditions: impl IntoIterator<Item = Expr>) -> Self {
        Query {
            filter: Expr::conjunction(conditions),
            ..Query::default()
        }
    }
}

/// Walks an [`Expr`] tree. Backends implement this to evaluate or translate conditions.
pub trait QueryVisitor {
    type Output;
    type Error: Into<StoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
