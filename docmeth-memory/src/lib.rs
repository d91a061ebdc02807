//! In-memory storage backend for docmeth.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It is meant for development and tests, and keeps rows in insertion order so results
//! are predictable without a sort.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Full cursor support** - Filtering, grouping, multi-key sorting, skip/limit and projection
//! - **Optional strictness** - Missing collections can be reported instead of read as empty
//!
//! # Quick Start
//!
//! ```ignore
//! use docmeth::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let birthdays = Collection::new("birthdays", InMemoryStore::builder().build().await?);
//!
//!     birthdays.insert([Birthday { id: 1, name: "Jonathan Ive".into() }]).await?;
//!
//!     let mut found = Birthday { id: 1, ..Default::default() };
//!     ops::one(&mut found).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmeth_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
