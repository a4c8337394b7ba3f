//! Customer-facing catalog built from POS inventory.
//!
//! # Architecture
//!
//! - Inventory is owned by the POS; the storefront only reads it
//! - [`aggregate`] fans out one read per configured store and merges the
//!   results into a single deduplicated listing
//! - [`CatalogService`] caches the aggregated snapshot via `moka` until it
//!   expires or [`CatalogService::refresh`] is called
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::catalog::{CatalogService, StockFilter, filter};
//!
//! let catalog = CatalogService::new(db, stores, StockFilter::Deferred, ttl);
//! let products = catalog.products().await?;
//! let phones = filter::filter_by_search(products.iter(), "iphone");
//! ```

mod aggregate;
mod error;
pub mod filter;
pub mod images;
mod normalize;

pub use aggregate::{StockFilter, aggregate};
pub use error::{CatalogError, ConfigurationError, FetchError};
pub use normalize::normalize;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use bazaar_core::{Category, CategoryInput, OwnerId, ProductId, StoreRef, classify};

use crate::db::{CollectionPath, DocumentStore, fields};

/// Document holding the merchandised product ids.
pub const FEATURED_DOC_ID: &str = "publicStorewebsite";

/// Maximum number of merchandised ids honoured.
pub const MAX_FEATURED_IDS: usize = 6;

const SNAPSHOT_KEY: &str = "catalog";

/// A catalog listing, possibly merged from several stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    /// Raw, store-defined category string.
    pub category: String,
    pub is_accessory: bool,
    pub is_custom_item: bool,
    pub color: Option<String>,
    pub storage: Option<String>,
    pub image_urls: Vec<String>,
    /// Always the first entry of `image_urls`.
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Stores this listing is available at, without duplicates.
    pub store_locations: Vec<StoreRef>,
}

impl Product {
    /// Browsing category derived from the item's attributes.
    #[must_use]
    pub fn category(&self) -> Category {
        classify(CategoryInput {
            name: &self.name,
            category: &self.category,
            is_accessory: self.is_accessory,
            is_custom_item: self.is_custom_item,
        })
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Merge an equivalent listing from another store into this one.
    fn absorb(&mut self, other: Self) {
        self.stock = self.stock.saturating_add(other.stock);
        for location in other.store_locations {
            if !self.store_locations.contains(&location) {
                self.store_locations.push(location);
            }
        }
        if self.image_urls.is_empty() && !other.image_urls.is_empty() {
            self.image_url = other.image_urls.first().cloned();
            self.image_urls = other.image_urls;
        }
    }
}

/// A single listing together with the display names of its stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    pub store_names: Vec<String>,
}

/// Cached access to the aggregated catalog.
///
/// Cheaply cloneable; clones share the cache.
pub struct CatalogService<S> {
    inner: Arc<CatalogServiceInner<S>>,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CatalogServiceInner<S> {
    db: Arc<S>,
    stores: Vec<StoreRef>,
    stock_filter: StockFilter,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl<S: DocumentStore + 'static> CatalogService<S> {
    /// Create a catalog service over `stores`.
    #[must_use]
    pub fn new(db: Arc<S>, stores: Vec<StoreRef>, stock_filter: StockFilter, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                db,
                stores,
                stock_filter,
                cache,
            }),
        }
    }

    /// The configured stores, in configuration order.
    #[must_use]
    pub fn stores(&self) -> &[StoreRef] {
        &self.inner.stores
    }

    /// The aggregated catalog, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Configuration` or `CatalogError::Fetch`; see
    /// [`aggregate`].
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(products) = self.inner.cache.get(SNAPSHOT_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products = Arc::new(
            aggregate(
                self.inner.db.as_ref(),
                &self.inner.stores,
                self.inner.stock_filter,
            )
            .await?,
        );

        self.inner
            .cache
            .insert(SNAPSHOT_KEY, Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// Drop the cached snapshot and aggregate again.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::products`].
    pub async fn refresh(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        self.inner.cache.invalidate(SNAPSHOT_KEY).await;
        self.products().await
    }

    /// Read one listing straight from its store.
    ///
    /// Composite ids name their store; bare ids are looked up in the first
    /// configured store. `locations` carries the merged listing's stores so
    /// every contributing store can be named; without it only the id's own
    /// store is.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Configuration` for a bare id when no store is
    /// configured, `CatalogError::NotFound` when the document does not exist,
    /// and `CatalogError::Store` when the read fails.
    #[instrument(skip(self, id, locations), fields(product_id = %id))]
    pub async fn product_detail(
        &self,
        id: &ProductId,
        locations: Option<&[StoreRef]>,
    ) -> Result<ProductDetail, CatalogError> {
        let store = match id.store() {
            Some(store) => store.clone(),
            None => self
                .inner
                .stores
                .first()
                .cloned()
                .ok_or(ConfigurationError::NoStores)?,
        };

        let document = self
            .inner
            .db
            .get(&CollectionPath::inventory(&store), id.doc_id())
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        let mut product = normalize(id.clone(), &store, &document.data);
        if let Some(locations) = locations.filter(|l| !l.is_empty()) {
            product.store_locations.clear();
            for location in locations {
                if !product.store_locations.contains(location) {
                    product.store_locations.push(location.clone());
                }
            }
        }

        let store_names = self.store_names(&product.store_locations).await;
        Ok(ProductDetail {
            product,
            store_names,
        })
    }

    /// Display names of the owners behind `locations`, without blanks or
    /// duplicates. Unreadable profiles are skipped.
    pub async fn store_names(&self, locations: &[StoreRef]) -> Vec<String> {
        let mut owners: Vec<&OwnerId> = Vec::new();
        for location in locations {
            if !owners.contains(&&location.owner_id) {
                owners.push(&location.owner_id);
            }
        }

        let users = CollectionPath::users();
        let profiles = join_all(
            owners
                .iter()
                .map(|owner| self.inner.db.get(&users, owner.as_str())),
        )
        .await;

        let mut names: Vec<String> = Vec::new();
        for (owner, profile) in owners.iter().zip(profiles) {
            match profile {
                Ok(Some(doc)) => {
                    if let Some(name) = fields::text(&doc.data, &["storeName"])
                        && !names.contains(&name)
                    {
                        names.push(name);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(owner_id = %owner, error = %e, "Failed to read store profile"),
            }
        }
        names
    }

    /// Merchandised product ids, at most [`MAX_FEATURED_IDS`].
    ///
    /// Any read failure yields an empty list.
    pub async fn featured_ids(&self) -> Vec<ProductId> {
        let document = match self
            .inner
            .db
            .get(&CollectionPath::public_store(), FEATURED_DOC_ID)
            .await
        {
            Ok(Some(document)) => document,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read featured items");
                return Vec::new();
            }
        };

        match document.data.get("hotItemIds") {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(Value::as_str)
                .take(MAX_FEATURED_IDS)
                .map(ProductId::decode)
                .collect(),
            _ => Vec::new(),
        }
    }
}
