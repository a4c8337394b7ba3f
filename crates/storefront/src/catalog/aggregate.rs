//! Multi-store inventory aggregation.
//!
//! Every configured store's inventory collection is fetched concurrently;
//! results are merged in configuration order so the outcome does not depend
//! on which store answered first.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use futures::future::try_join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use bazaar_core::{DocId, ProductId, StoreRef};

use super::error::{CatalogError, ConfigurationError, FetchError};
use super::normalize::normalize;
use super::Product;
use crate::db::{CollectionPath, Document, DocumentStore, ListFilter};

/// Where the "in stock" filter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockFilter {
    /// Ask the backend for `stock >= 1` only. Documents whose stock is stored
    /// as a string are excluded by the backend.
    AtSource,
    /// Fetch everything; callers filter with [`in_stock`](super::filter::in_stock).
    #[default]
    Deferred,
}

impl StockFilter {
    const fn list_filter(self) -> ListFilter {
        match self {
            Self::AtSource => ListFilter::AtLeast {
                field: "stock",
                min: 1.0,
            },
            Self::Deferred => ListFilter::All,
        }
    }
}

impl std::str::FromStr for StockFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(Self::AtSource),
            "caller" => Ok(Self::Deferred),
            other => Err(format!("expected 'source' or 'caller', got '{other}'")),
        }
    }
}

/// Listings that are the same item on sale at different stores.
#[derive(Debug, PartialEq, Eq, Hash)]
struct DedupKey {
    name: String,
    price: Decimal,
    color: String,
    storage: String,
}

impl DedupKey {
    fn of(product: &Product) -> Self {
        Self {
            name: product.name.trim().to_lowercase(),
            price: product.price.normalize(),
            color: product.color.clone().unwrap_or_default(),
            storage: product.storage.clone().unwrap_or_default(),
        }
    }
}

/// Fetch, normalize, and merge the inventory of every store in `stores`.
///
/// With a single store every document becomes its own listing under its bare
/// document id. With several stores listings get composite ids and
/// equivalent listings are merged: stock is summed, store locations are
/// unioned, and images are taken from the first contributor that has any.
///
/// # Errors
///
/// Returns `CatalogError::Configuration` when `stores` is empty and
/// `CatalogError::Fetch` when any store's inventory cannot be read; no
/// partial catalog is returned.
pub async fn aggregate<S: DocumentStore>(
    db: &S,
    stores: &[StoreRef],
    stock_filter: StockFilter,
) -> Result<Vec<Product>, CatalogError> {
    if stores.is_empty() {
        return Err(ConfigurationError::NoStores.into());
    }

    let filter = stock_filter.list_filter();
    let fetched = try_join_all(stores.iter().map(|store| async move {
        db.list(&CollectionPath::inventory(store), filter)
            .await
            .map_err(|source| FetchError {
                store: store.clone(),
                source,
            })
    }))
    .await?;

    let multi_store = stores.len() > 1;
    let mut products: Vec<Product> = Vec::new();
    let mut index: HashMap<DedupKey, usize> = HashMap::new();
    let mut fetched_count = 0usize;

    for (store, documents) in stores.iter().zip(fetched) {
        debug!(store = %store, documents = documents.len(), "Fetched inventory");
        fetched_count += documents.len();

        for Document { id, data } in documents {
            let doc_id = match DocId::parse(&id) {
                Ok(doc_id) => doc_id,
                Err(e) => {
                    warn!(store = %store, doc_id = %id, error = %e, "Skipping inventory document");
                    continue;
                }
            };

            if !multi_store {
                products.push(normalize(ProductId::Local(doc_id.to_string()), store, &data));
                continue;
            }

            let product = normalize(ProductId::composite(store.clone(), doc_id), store, &data);
            match index.entry(DedupKey::of(&product)) {
                Entry::Occupied(slot) => {
                    if let Some(existing) = products.get_mut(*slot.get()) {
                        existing.absorb(product);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(products.len());
                    products.push(product);
                }
            }
        }
    }

    info!(
        stores = stores.len(),
        documents = fetched_count,
        products = products.len(),
        "Catalog aggregated"
    );

    Ok(products)
}
