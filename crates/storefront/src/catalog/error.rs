//! Catalog failures.

use thiserror::Error;

use bazaar_core::StoreRef;

use crate::db::StoreError;

/// No usable store topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error(
        "POS store not configured. Set POS_OWNER_UID and POS_STORE_ID (or POS_STORE_IDS), or POS_STORES"
    )]
    NoStores,
}

/// A single store's inventory could not be read.
#[derive(Debug, Error)]
#[error("failed to load inventory for store {store}: {source}")]
pub struct FetchError {
    pub store: StoreRef,
    #[source]
    pub source: StoreError,
}

/// Errors from the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The requested listing does not exist.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// A single-document read failed.
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}
