//! Application state shared across front ends.

use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::db::DocumentStore;
use crate::orders::OrderHistory;

/// Application state shared across all commands and handlers.
///
/// This struct is cheaply cloneable via `Arc` and wires the catalog,
/// checkout and order history services to one document store.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<S> {
    config: StorefrontConfig,
    db: Arc<S>,
    catalog: CatalogService<S>,
    checkout: Checkout<S>,
    history: OrderHistory<S>,
}

impl<S: DocumentStore + 'static> AppState<S> {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `db` - Document store every service reads from and writes to
    #[must_use]
    pub fn new(config: StorefrontConfig, db: S) -> Self {
        let db = Arc::new(db);
        let catalog = CatalogService::new(
            Arc::clone(&db),
            config.stores.clone(),
            config.stock_filter,
            config.catalog_ttl,
        );
        let checkout = Checkout::new(Arc::clone(&db), config.stores.clone(), config.currency);
        let history = OrderHistory::new(Arc::clone(&db));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                catalog,
                checkout,
                history,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn db(&self) -> &S {
        &self.inner.db
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService<S> {
        &self.inner.catalog
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &Checkout<S> {
        &self.inner.checkout
    }

    /// Get a reference to the order history service.
    #[must_use]
    pub fn history(&self) -> &OrderHistory<S> {
        &self.inner.history
    }
}
