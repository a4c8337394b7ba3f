//! Newtype IDs for type-safe document references.
//!
//! Every identifier in the POS document database is an opaque string. The
//! `define_id!` macro wraps those strings so an owner id can never be passed
//! where a store id is expected, and so the reserved composite separator
//! ([`COMPOSITE_ID_SEP`]) can never leak into a component.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator used by composite product ids (`ownerId|storeId|docId`).
///
/// The character is reserved: it must never appear inside an owner, store,
/// or document id.
pub const COMPOSITE_ID_SEP: char = '|';

/// Errors that can occur when constructing an id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The id is empty after trimming.
    #[error("{kind} cannot be empty")]
    Empty {
        /// Which kind of id was rejected.
        kind: &'static str,
    },
    /// The id contains the reserved composite separator.
    #[error("{kind} must not contain '|': {value}")]
    ReservedSeparator {
        /// Which kind of id was rejected.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()` which trims and rejects empty values or the reserved separator
/// - `as_str()`, `Display`, `FromStr`, and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use bazaar_core::define_id;
/// define_id!(WidgetId);
///
/// let id = WidgetId::parse(" w-1 ").unwrap();
/// assert_eq!(id.as_str(), "w-1");
/// assert!(WidgetId::parse("a|b").is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an id, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`IdError`](crate::IdError) if the value is blank or
            /// contains the composite separator.
            pub fn parse(value: &str) -> ::core::result::Result<Self, $crate::IdError> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err($crate::IdError::Empty {
                        kind: stringify!($name),
                    });
                }
                if trimmed.contains($crate::COMPOSITE_ID_SEP) {
                    return Err($crate::IdError::ReservedSeparator {
                        kind: stringify!($name),
                        value: trimmed.to_owned(),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(OwnerId);
define_id!(StoreId);
define_id!(DocId);
define_id!(CustomerId);

/// One POS store: the `(ownerId, storeId)` pair inventory and orders live under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRef {
    pub owner_id: OwnerId,
    pub store_id: StoreId,
}

impl StoreRef {
    #[must_use]
    pub const fn new(owner_id: OwnerId, store_id: StoreId) -> Self {
        Self { owner_id, store_id }
    }

    /// Parse both components.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if either component is blank or contains the separator.
    pub fn parse(owner_id: &str, store_id: &str) -> Result<Self, IdError> {
        Ok(Self::new(OwnerId::parse(owner_id)?, StoreId::parse(store_id)?))
    }
}

impl fmt::Display for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner_id, self.store_id)
    }
}

/// Identity of a catalog listing or cart line.
///
/// Single-store deployments use the bare inventory document id; as soon as
/// more than one store is configured every listing carries a composite id
/// so the owning store can be recovered from the id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductId {
    /// Store-local document id.
    Local(String),
    /// `ownerId|storeId|docId`.
    Composite { store: StoreRef, doc_id: DocId },
}

impl ProductId {
    #[must_use]
    pub const fn composite(store: StoreRef, doc_id: DocId) -> Self {
        Self::Composite { store, doc_id }
    }

    /// Decode an encoded id.
    ///
    /// Exactly three non-empty, separator-delimited components decode to
    /// [`ProductId::Composite`]; anything else is kept verbatim as a
    /// [`ProductId::Local`] id.
    #[must_use]
    pub fn decode(encoded: &str) -> Self {
        let parts: Vec<&str> = encoded.split(COMPOSITE_ID_SEP).collect();
        if let [owner, store, doc] = parts.as_slice()
            && let (Ok(store), Ok(doc_id)) = (StoreRef::parse(owner, store), DocId::parse(doc))
        {
            return Self::Composite { store, doc_id };
        }
        Self::Local(encoded.to_owned())
    }

    /// The store encoded in the id, if any.
    #[must_use]
    pub const fn store(&self) -> Option<&StoreRef> {
        match self {
            Self::Local(_) => None,
            Self::Composite { store, .. } => Some(store),
        }
    }

    /// The store-local document id.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        match self {
            Self::Local(id) => id,
            Self::Composite { doc_id, .. } => doc_id.as_str(),
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(id) => f.write_str(id),
            Self::Composite { store, doc_id } => write!(
                f,
                "{}{COMPOSITE_ID_SEP}{}{COMPOSITE_ID_SEP}{doc_id}",
                store.owner_id, store.store_id
            ),
        }
    }
}

impl FromStr for ProductId {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::decode(s))
    }
}

impl Serialize for ProductId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Ok(Self::decode(&encoded))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store(owner: &str, id: &str) -> StoreRef {
        StoreRef::parse(owner, id).unwrap()
    }

    #[test]
    fn test_id_parse_trims() {
        assert_eq!(OwnerId::parse("  owner ").unwrap().as_str(), "owner");
    }

    #[test]
    fn test_id_parse_rejects_blank() {
        assert!(matches!(StoreId::parse("   "), Err(IdError::Empty { .. })));
    }

    #[test]
    fn test_id_parse_rejects_separator() {
        assert!(matches!(
            DocId::parse("a|b"),
            Err(IdError::ReservedSeparator { .. })
        ));
    }

    #[test]
    fn test_composite_encoding() {
        let id = ProductId::composite(store("ownerA", "s1"), DocId::parse("doc9").unwrap());
        assert_eq!(id.to_string(), "ownerA|s1|doc9");
    }

    #[test]
    fn test_decode_composite() {
        let id = ProductId::decode("ownerA|s1|doc9");
        assert_eq!(id.store(), Some(&store("ownerA", "s1")));
        assert_eq!(id.doc_id(), "doc9");
    }

    #[test]
    fn test_decode_local() {
        let id = ProductId::decode("doc9");
        assert_eq!(id, ProductId::Local("doc9".to_string()));
        assert_eq!(id.store(), None);
    }

    #[test]
    fn test_decode_wrong_arity_is_local() {
        assert!(matches!(ProductId::decode("a|b"), ProductId::Local(_)));
        assert!(matches!(ProductId::decode("a|b|c|d"), ProductId::Local(_)));
    }

    #[test]
    fn test_decode_empty_component_is_local() {
        assert!(matches!(ProductId::decode("|s1|doc"), ProductId::Local(_)));
    }

    #[test]
    fn test_product_id_serde_as_string() {
        let id = ProductId::decode("o|s|d");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"o|s|d\"");
        let back: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_store_ref_serde_camel_case() {
        let json = serde_json::to_value(store("o", "s")).unwrap();
        assert_eq!(json, serde_json::json!({"ownerId": "o", "storeId": "s"}));
    }
}
