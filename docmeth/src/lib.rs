//! Main docmeth crate: short helpers for fetching records from a document store.
//!
//! This crate is the primary entry point. It re-exports the core types from the
//! sub-crates, the `Persistent` derive macro and the available storage backends.
//!
//! # Features
//!
//! - **Record lookups** - Fill a record by its own identifier or by conditions
//! - **Bulk fetches** - Load every matching row into a vector
//! - **Existence checks** - Ask whether a record is stored without loading it
//! - **Cursor modifiers** - Limit, skip, sort, select, filter, group and paginate before fetching
//!
//! # Quick Start
//!
//! ```ignore
//! use docmeth::{prelude::*, memory::InMemoryStore};
//! use serde::{Serialize, Deserialize};
//! use std::sync::LazyLock;
//!
//! static STORE: LazyLock<InMemoryStore> = LazyLock::new(InMemoryStore::new);
//!
//! fn store() -> InMemoryStore {
//!     STORE.clone()
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Persistent)]
//! #[persistent(collection = "birthdays", store = "store")]
//! pub struct Birthday {
//!     pub id: i64,
//!     pub name: String,
//!     pub born: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     Birthday::default()
//!         .collection()
//!         .insert([Birthday { id: 1, name: "Jonathan Ive".into(), born: "1967-02-27".into() }])
//!         .await?;
//!
//!     // Fill a record from its id
//!     let mut birthday = Birthday { id: 1, ..Default::default() };
//!     ops::one(&mut birthday).await?;
//!
//!     // Everything born after 1960, youngest first
//!     let mut rows: Vec<Birthday> = Vec::new();
//!     ops::all_op(
//!         &birthday,
//!         modifier::sort(["-born"]),
//!         &mut rows,
//!         [Filter::gt("born", "1960")],
//!     )
//!     .await?;
//!
//!     assert!(ops::exists(&birthday, []).await);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use docmeth_core::{backend, collection, cursor, error, modifier, ops, page, query, record};
pub use docmeth_macros::Persistent;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docmeth_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docmeth_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
