//! Document database access.
//!
//! The POS back office owns a hierarchical document database. The storefront
//! only needs three primitives over it: list a collection, read one document,
//! and append a document with a generated id.
//!
//! # Collections
//!
//! - `users/{ownerId}/stores/{storeId}/inventory` - POS inventory (read)
//! - `users/{ownerId}/stores/{storeId}/websiteOrders` - storefront orders (append)
//! - `users/{customerId}/orderRefs` - per-customer order index (append, read)
//! - `users` - owner profiles carrying `storeName` (read)
//! - `publicStore` - merchandising document with `hotItemIds` (read)
//!
//! # Backends
//!
//! - [`MemoryDocumentStore`] - in-process store for tests and seeded demos
//! - [`PgDocumentStore`] - `PostgreSQL` JSONB table, see `crates/storefront/migrations/`

pub mod fields;
mod memory;
mod postgres;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bazaar_core::{CustomerId, StoreRef};

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Raw, loosely-typed document body.
pub type Record = Map<String, Value>;

/// Errors from the document database.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `PostgreSQL` query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migrations failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The backend refused or could not serve the request.
    #[error("{collection} unavailable: {message}")]
    Unavailable { collection: String, message: String },

    /// A stored document is not a JSON object.
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// A value could not be encoded as a document.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Slash-separated path of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Owner profiles.
    pub const USERS: &'static str = "users";
    /// Deployment-wide merchandising documents.
    pub const PUBLIC_STORE: &'static str = "publicStore";

    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn inventory(store: &StoreRef) -> Self {
        Self(format!(
            "users/{}/stores/{}/inventory",
            store.owner_id, store.store_id
        ))
    }

    #[must_use]
    pub fn website_orders(store: &StoreRef) -> Self {
        Self(format!(
            "users/{}/stores/{}/websiteOrders",
            store.owner_id, store.store_id
        ))
    }

    #[must_use]
    pub fn order_refs(customer: &CustomerId) -> Self {
        Self(format!("users/{customer}/orderRefs"))
    }

    #[must_use]
    pub fn users() -> Self {
        Self(Self::USERS.to_string())
    }

    #[must_use]
    pub fn public_store() -> Self {
        Self(Self::PUBLIC_STORE.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document id together with its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Record,
}

/// Server-side filter applied when listing a collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListFilter {
    All,
    /// Keep documents whose numeric `field` is `>= min`. Documents where the
    /// field is missing or not a number are excluded.
    AtLeast { field: &'static str, min: f64 },
}

impl ListFilter {
    /// Evaluate the filter against a document body.
    #[must_use]
    pub fn matches(&self, data: &Record) -> bool {
        match self {
            Self::All => true,
            Self::AtLeast { field, min } => data
                .get(*field)
                .and_then(Value::as_f64)
                .is_some_and(|value| value >= *min),
        }
    }
}

/// The narrow interface the storefront consumes from the document database.
pub trait DocumentStore: Send + Sync {
    /// List every document in a collection that passes `filter`.
    fn list(
        &self,
        collection: &CollectionPath,
        filter: ListFilter,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Read a single document.
    fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Append a document, returning its generated id.
    fn add(
        &self,
        collection: &CollectionPath,
        data: Record,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;
}

/// Serialize a value into a document body.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if encoding fails, or
/// `StoreError::DataCorruption` if the value is not a JSON object.
pub fn to_record<T: serde::Serialize>(value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::DataCorruption(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Flatten a seed of the form
/// `{"<collection path>": {"<doc id>": {...}, ...}, ...}` into documents.
///
/// # Errors
///
/// Returns `StoreError::DataCorruption` if the seed, a collection, or a
/// document body is not a JSON object.
pub fn parse_seed(seed: Value) -> Result<Vec<(CollectionPath, Document)>, StoreError> {
    let Value::Object(collections) = seed else {
        return Err(StoreError::DataCorruption(
            "seed must be an object keyed by collection path".to_string(),
        ));
    };

    let mut documents = Vec::new();
    for (path, docs) in collections {
        let Value::Object(docs) = docs else {
            return Err(StoreError::DataCorruption(format!(
                "collection {path} must be an object keyed by document id"
            )));
        };
        let collection = CollectionPath::new(path);
        for (id, data) in docs {
            let Value::Object(data) = data else {
                return Err(StoreError::DataCorruption(format!(
                    "document {collection}/{id} must be an object"
                )));
            };
            documents.push((collection.clone(), Document { id, data }));
        }
    }
    Ok(documents)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the storefront migrations.
///
/// # Errors
///
/// Returns `StoreError::Migration` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_collection_paths() {
        let store = StoreRef::parse("ownerA", "s1").unwrap();
        assert_eq!(
            CollectionPath::inventory(&store).as_str(),
            "users/ownerA/stores/s1/inventory"
        );
        assert_eq!(
            CollectionPath::website_orders(&store).as_str(),
            "users/ownerA/stores/s1/websiteOrders"
        );
        let customer = CustomerId::parse("cust-1").unwrap();
        assert_eq!(
            CollectionPath::order_refs(&customer).as_str(),
            "users/cust-1/orderRefs"
        );
    }

    #[test]
    fn test_list_filter_at_least() {
        let filter = ListFilter::AtLeast {
            field: "stock",
            min: 1.0,
        };
        assert!(filter.matches(&record(json!({"stock": 3}))));
        assert!(!filter.matches(&record(json!({"stock": 0}))));
        assert!(!filter.matches(&record(json!({"stock": "5"}))));
        assert!(!filter.matches(&record(json!({}))));
        assert!(ListFilter::All.matches(&record(json!({}))));
    }

    #[test]
    fn test_parse_seed() {
        let documents = parse_seed(json!({
            "users": {"ownerA": {"storeName": "Accra Central"}},
            "users/ownerA/stores/s1/inventory": {"d1": {"name": "A"}, "d2": {"name": "B"}}
        }))
        .unwrap();
        assert_eq!(documents.len(), 3);
        assert!(
            documents
                .iter()
                .any(|(path, doc)| path.as_str() == "users" && doc.id == "ownerA")
        );

        assert!(matches!(
            parse_seed(json!({"users": [1]})),
            Err(StoreError::DataCorruption(_))
        ));
        assert!(matches!(
            parse_seed(json!({"users": {"ownerA": "x"}})),
            Err(StoreError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_to_record_rejects_non_objects() {
        assert!(to_record(&json!({"a": 1})).is_ok());
        assert!(matches!(
            to_record(&json!([1, 2])),
            Err(StoreError::DataCorruption(_))
        ));
    }
}
