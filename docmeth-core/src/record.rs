//! The record capability and identifier resolution.
//!
//! Any type can be used with the lookup helpers in [`crate::ops`] once it implements
//! [`Persistent`]: the only thing required is a way to reach the collection the record
//! lives in. The identifier is found at runtime by serializing the record and looking
//! for its `id` field, unless the implementation (or `#[derive(Persistent)]`) provides a
//! direct accessor.
//!
//! # Example
//!
//! ```ignore
//! use docmeth::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! pub struct Birthday {
//!     pub id: i64,
//!     pub name: String,
//! }
//!
//! impl Persistent for Birthday {
//!     fn collection(&self) -> Collection {
//!         Collection::new("birthdays", STORE.clone())
//!     }
//! }
//! ```

use bson::{Bson, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    collection::Collection,
    error::{StoreError, StoreResult},
};

/// Conventional name of the identifier field.
pub const ID_FIELD: &str = "id";

/// Capability shared by every record type the lookup helpers accept.
pub trait Persistent: Serialize + DeserializeOwned + Send + Sync {
    /// Returns a handle to the collection holding records of this type.
    fn collection(&self) -> Collection;

    /// Returns the record's integer identifier.
    ///
    /// The default implementation calls [`resolve_identifier`]. Override it to read the
    /// field directly.
    fn identifier(&self) -> StoreResult<i64> {
        resolve_identifier(self)
    }
}

impl<P: Persistent> Persistent for Box<P> {
    fn collection(&self) -> Collection {
        (**self).collection()
    }

    fn identifier(&self) -> StoreResult<i64> {
        (**self).identifier()
    }
}

/// Locates the single field named `id` (ignoring ASCII case) on a record and returns its
/// integer value.
///
/// References and boxes are looked through, since they serialize exactly like the value
/// they point to.
///
/// # Errors
///
/// - [`StoreError::NoIdentifierField`] when the record has zero or several `id` fields,
///   or does not serialize to a document at all
/// - [`StoreError::InvalidIdentifier`] when the field does not hold an integer
/// - [`StoreError::Serialization`] when the record cannot be serialized
pub fn resolve_identifier<T>(record: &T) -> StoreResult<i64>
where
    T: Serialize + ?Sized,
{
    let record_name = std::any::type_name::<T>();

    let document = match serialize_to_bson(record)? {
        Bson::Document(document) => document,
        _ => {
            return Err(StoreError::NoIdentifierField { record: record_name, matches: 0 });
        }
    };

    let candidates = document
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(ID_FIELD))
        .map(|(_, value)| value)
        .collect::<Vec<_>>();

    match candidates.as_slice() {
        [Bson::Int32(id)] => Ok(i64::from(*id)),
        [Bson::Int64(id)] => Ok(*id),
        [other] => Err(StoreError::InvalidIdentifier(record_name, other.to_string())),
        _ => Err(StoreError::NoIdentifierField {
            record: record_name,
            matches: candidates.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Birthday {
        id: i32,
        name: String,
    }

    #[derive(Serialize)]
    struct Renamed {
        #[serde(rename = "ID")]
        key: i64,
    }

    #[derive(Serialize)]
    struct Anonymous {
        name: String,
    }

    #[derive(Serialize)]
    struct Ambiguous {
        id: i64,
        #[serde(rename = "Id")]
        legacy_id: i64,
    }

    #[derive(Serialize)]
    struct Textual {
        id: String,
    }

    fn birthday() -> Birthday {
        Birthday { id: 7, name: "Hayao Miyazaki".to_string() }
    }

    #[test]
    fn reads_single_id_field() {
        assert_eq!(resolve_identifier(&birthday()).unwrap(), 7);
        assert_eq!(resolve_identifier(&Renamed { key: 42 }).unwrap(), 42);
    }

    #[test]
    fn looks_through_indirection() {
        let record = birthday();
        let by_ref = &&&record;

        assert_eq!(resolve_identifier(by_ref).unwrap(), 7);
        assert_eq!(resolve_identifier(&Box::new(birthday())).unwrap(), 7);
    }

    #[test]
    fn missing_field_is_an_error() {
        let err = resolve_identifier(&Anonymous { name: "x".into() }).unwrap_err();

        assert!(matches!(err, StoreError::NoIdentifierField { matches: 0, .. }));
    }

    #[test]
    fn ambiguous_field_is_an_error() {
        let err = resolve_identifier(&Ambiguous { id: 1, legacy_id: 2 }).unwrap_err();

        assert!(matches!(err, StoreError::NoIdentifierField { matches: 2, .. }));
    }

    #[test]
    fn non_document_is_an_error() {
        assert!(matches!(
            resolve_identifier(&5_i64),
            Err(StoreError::NoIdentifierField { matches: 0, .. }),
        ));
    }

    #[test]
    fn non_integer_id_is_rejected() {
        assert!(matches!(
            resolve_identifier(&Textual { id: "abc".into() }),
            Err(StoreError::InvalidIdentifier(..)),
        ));
    }
}
