//! Error types and result types for record lookups and store operations.
//!
//! Every fallible operation in this crate returns [`StoreResult<T>`]. Errors raised by a
//! backend travel through the lookup helpers untouched, so callers match on the same
//! variants whether they talk to a backend directly or through [`crate::ops`].

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when fetching records from a store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The record does not expose exactly one field named `id`.
    /// `matches` is the number of candidate fields that were found (zero or more than one).
    #[error("No id field found on {record} ({matches} candidates)")]
    NoIdentifierField {
        record: &'static str,
        matches: usize,
    },
    /// The record's `id` field exists but does not hold an integer.
    #[error("Identifier of {0} is not an integer: {1}")]
    InvalidIdentifier(&'static str, String),
    /// Serialization/deserialization error when converting between a record and BSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given ID already exists in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// No document matched the conditions of a single-row fetch.
    /// The argument is the collection name.
    #[error("No matching document in collection {0}")]
    DocumentNotFound(String),
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// The document is not a BSON document or has an invalid structure.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A condition or cursor setting could not be understood.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
