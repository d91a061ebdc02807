//! Convenient re-exports of commonly used types from docmeth.
//!
//! ```ignore
//! use docmeth::prelude::*;
//! ```
//!
//! This brings in the record trait and its derive, the lookup helpers and modifiers
//! (as modules, so calls read `ops::one` and `modifier::limit`), the cursor and
//! collection types, condition builders, and the error types.

pub use docmeth_core::{
    ops,
    modifier,
    record::{Persistent, resolve_identifier},
    collection::Collection,
    cursor::ResultCursor,
    backend::{StoreBackend, StoreBackendBuilder},
    query::{Query, QueryVisitor, Expr, Sort, SortDirection, FieldOp, Filter},
    page::PaginationParams,
    error::{StoreError, StoreResult},
};
pub use docmeth_macros::Persistent;
