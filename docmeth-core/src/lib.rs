//! Shortcuts for fetching records from a document store.
//!
//! This crate is the core of the docmeth project and provides:
//!
//! - **Record capability** ([`record`]) - The [`Persistent`](record::Persistent) trait and identifier resolution
//! - **Lookup shortcuts** ([`ops`]) - Fetch one, fetch many, existence checks, fetch with a modifier
//! - **Cursor modifiers** ([`modifier`]) - Limit, skip, sort, select, filter, group and paginate
//! - **Result cursors** ([`cursor`]) - Pending queries with mutators and materializers
//! - **Collections** ([`collection`]) - Named handles on a shared backend
//! - **Conditions** ([`query`]) - Filter expressions and the backend-facing query
//! - **Store backend abstraction** ([`backend`]) - The trait storage implementations provide
//! - **Error handling** ([`error`]) - The error enum and result alias
//! - **Pagination** ([`page`]) - Page-number parameters that turn into a modifier
//!
//! # Example
//!
//! ```ignore
//! use docmeth::prelude::*;
//!
//! let mut birthday = Birthday { id: 1, ..Default::default() };
//! ops::one(&mut birthday).await?;
//!
//! let mut oldest_first: Vec<Birthday> = Vec::new();
//! ops::all_op(&birthday, modifier::sort(["born"]), &mut oldest_first, []).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmeth_core;

pub mod backend;
pub mod collection;
pub mod cursor;
pub mod error;
pub mod modifier;
pub mod ops;
pub mod page;
pub mod query;
pub mod record;
