//! MongoDB backend implementation for docmeth.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait, so the
//! lookup helpers can run against a real database. Conditions translate into MongoDB
//! filters; grouped queries run as aggregation pipelines.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docmeth = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docmeth::{backend::StoreBackendBuilder, collection::Collection, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!     let birthdays = Collection::new("birthdays", store);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmeth_mongodb;

pub mod store;
pub mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
