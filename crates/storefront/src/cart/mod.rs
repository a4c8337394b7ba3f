//! Session cart with stock-bounded quantities.
//!
//! Every mutation goes through one clamp-and-persist step: the affected
//! line's quantity is clamped to `[0, maxStock]`, a zero quantity removes the
//! line, and the whole cart is written to [`CartStorage`] before the call
//! returns. Storage failures are logged and never undo the in-memory change.

mod storage;

pub use storage::{CartStorage, CartStorageError, FileCartStorage, MemoryCartStorage};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bazaar_core::ProductId;

use crate::catalog::Product;

/// One cart line.
///
/// `price` and `max_stock` are snapshots taken when the item was added and
/// are not re-validated against the live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub max_stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartItem {
    /// `price × quantity`, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// What "add to cart" supplies: a cart line without a quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub max_stock: u32,
    pub image_url: Option<String>,
}

impl From<&Product> for NewCartItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            max_stock: product.stock,
            image_url: product.image_url.clone(),
        }
    }
}

/// The session cart.
pub struct Cart<P> {
    items: Vec<CartItem>,
    storage: P,
}

impl<P: CartStorage> Cart<P> {
    /// An empty cart that persists to `storage`. Nothing is read.
    #[must_use]
    pub const fn empty(storage: P) -> Self {
        Self {
            items: Vec::new(),
            storage,
        }
    }

    /// Hydrate the cart from `storage`.
    ///
    /// Missing, unreadable, or corrupt contents give an empty cart. Stored
    /// lines are re-clamped, and repeated product ids keep their first line.
    #[must_use]
    pub fn load(storage: P) -> Self {
        let stored = match storage.load() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt stored cart");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                Vec::new()
            }
        };

        let mut items: Vec<CartItem> = Vec::with_capacity(stored.len());
        for mut item in stored {
            item.quantity = item.quantity.min(item.max_stock);
            if item.quantity > 0 && !items.iter().any(|i| i.product_id == item.product_id) {
                items.push(item);
            }
        }

        debug!(lines = items.len(), "Cart loaded");
        Self { items, storage }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `price × quantity`, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.line_total()))
    }

    /// Add `quantity` of an item.
    ///
    /// The request is clamped to the item's `max_stock` and ignored if
    /// nothing is left. An existing line keeps its name and price, takes the
    /// new `max_stock`, and its merged quantity is clamped to it.
    pub fn add(&mut self, item: NewCartItem, quantity: u32) {
        let quantity = quantity.min(item.max_stock);
        if quantity < 1 {
            return;
        }

        let product_id = item.product_id.clone();
        self.put_line(&product_id, |existing| {
            Some(match existing {
                Some(line) => CartItem {
                    quantity: line.quantity.saturating_add(quantity),
                    max_stock: item.max_stock,
                    ..line.clone()
                },
                None => CartItem {
                    product_id: item.product_id,
                    name: item.name,
                    price: item.price,
                    quantity,
                    max_stock: item.max_stock,
                    image_url: item.image_url,
                },
            })
        });
    }

    /// Delete a line unconditionally.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.put_line(product_id, |_| None);
    }

    /// Set a line's quantity, clamped to `[0, max_stock]`; 0 removes it.
    /// Unknown products are ignored.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        self.put_line(product_id, |existing| {
            existing.map(|line| CartItem {
                quantity,
                ..line.clone()
            })
        });
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Replace (or drop) the line for `product_id`, clamp it, and persist.
    fn put_line<F>(&mut self, product_id: &ProductId, update: F)
    where
        F: FnOnce(Option<&CartItem>) -> Option<CartItem>,
    {
        let position = self.items.iter().position(|i| &i.product_id == product_id);
        let next = update(position.and_then(|p| self.items.get(p)));

        let next = next
            .map(|mut line| {
                line.quantity = line.quantity.min(line.max_stock);
                line
            })
            .filter(|line| line.quantity > 0);

        match (position, next) {
            (Some(p), Some(line)) => {
                if let Some(slot) = self.items.get_mut(p) {
                    *slot = line;
                }
            }
            (Some(p), None) => {
                self.items.remove(p);
            }
            (None, Some(line)) => self.items.push(line),
            (None, None) => return,
        }

        self.persist();
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.items)
            .map_err(|e| e.to_string())
            .and_then(|json| self.storage.save(&json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FailingStorage;

    impl CartStorage for FailingStorage {
        fn load(&self) -> Result<Option<String>, CartStorageError> {
            Err(std::io::Error::other("unavailable").into())
        }

        fn save(&self, _contents: &str) -> Result<(), CartStorageError> {
            Err(std::io::Error::other("read-only").into())
        }
    }

    fn new_item(id: &str, price: i64, max_stock: u32) -> NewCartItem {
        NewCartItem {
            product_id: ProductId::decode(id),
            name: format!("Item {id}"),
            price: Decimal::from(price),
            max_stock,
            image_url: None,
        }
    }

    fn id(s: &str) -> ProductId {
        ProductId::decode(s)
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let mut cart = Cart::empty(MemoryCartStorage::new());
        cart.add(new_item("a", 10, 3), 5);
        assert_eq!(cart.get(&id("a")).unwrap().quantity, 3);
    }

    #[test]
    fn test_add_zero_or_out_of_stock_is_noop() {
        let mut cart = Cart::empty(MemoryCartStorage::new());
        cart.add(new_item("a", 10, 3), 0);
        cart.add(new_item("b", 10, 0), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_re_add_merges_and_reclamps_to_new_stock() {
        let mut cart = Cart::empty(MemoryCartStorage::new());
        cart.add(new_item("a", 10, 5), 3);
        cart.add(new_item("a", 99, 4), 3);

        let line = cart.get(&id("a")).unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(line.max_stock, 4);
        assert_eq!(line.price, Decimal::from(10));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_set_quantity_clamps_and_removes_at_zero() {
        let mut cart = Cart::empty(MemoryCartStorage::new());
        cart.add(new_item("a", 10, 3), 1);

        cart.set_quantity(&id("a"), 10);
        assert_eq!(cart.get(&id("a")).unwrap().quantity, 3);

        cart.set_quantity(&id("a"), 0);
        assert!(cart.get(&id("a")).is_none());

        cart.set_quantity(&id("missing"), 2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_is_idempotent() {
        let mut once = Cart::empty(MemoryCartStorage::new());
        once.add(new_item("a", 10, 5), 1);
        let mut twice = Cart::empty(MemoryCartStorage::new());
        twice.add(new_item("a", 10, 5), 1);

        once.set_quantity(&id("a"), 2);
        twice.set_quantity(&id("a"), 2);
        twice.set_quantity(&id("a"), 2);
        assert_eq!(once.items(), twice.items());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::empty(MemoryCartStorage::new());
        cart.add(new_item("a", 10, 3), 1);
        cart.add(new_item("b", 10, 3), 1);
        cart.remove(&id("a"));
        assert_eq!(cart.items().len(), 1);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_derived_totals() {
        let mut cart = Cart::empty(MemoryCartStorage::new());
        cart.add(new_item("a", 4500, 3), 2);
        cart.add(new_item("b", 25, 10), 4);
        assert_eq!(cart.total_items(), 6);
        assert_eq!(cart.subtotal(), Decimal::from(9100));
    }

    #[test]
    fn test_extreme_prices_saturate() {
        let mut cart = Cart::empty(MemoryCartStorage::new());
        let mut huge = new_item("a", 1, 5);
        huge.price = "79228162514264337593543950".parse().unwrap();
        cart.add(huge, 5);
        cart.add(new_item("b", 25, 10), 1);
        assert_eq!(cart.get(&id("a")).unwrap().line_total(), Decimal::MAX);
        assert_eq!(cart.subtotal(), Decimal::MAX);
    }

    #[test]
    fn test_every_mutation_persists() {
        let storage = MemoryCartStorage::new();
        let mut cart = Cart::empty(storage.clone());
        cart.add(new_item("o|s|a", 10, 3), 2);

        let reloaded = Cart::load(storage.clone());
        assert_eq!(reloaded.items(), cart.items());

        cart.clear();
        assert_eq!(storage.contents().as_deref(), Some("[]"));
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        for raw in ["not json", "{\"a\": 1}", "[{\"productId\": 5}]"] {
            let cart = Cart::load(MemoryCartStorage::with_contents(raw));
            assert!(cart.is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_load_sanitizes_lines() {
        let raw = r#"[
            {"productId": "a", "name": "A", "price": "10", "quantity": 9, "maxStock": 2},
            {"productId": "b", "name": "B", "price": "10", "quantity": 0, "maxStock": 2},
            {"productId": "a", "name": "A2", "price": "10", "quantity": 1, "maxStock": 2}
        ]"#;
        let cart = Cart::load(MemoryCartStorage::with_contents(raw));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[0].name, "A");
    }

    #[test]
    fn test_storage_failures_do_not_roll_back() {
        let mut cart = Cart::load(FailingStorage);
        assert!(cart.is_empty());
        cart.add(new_item("a", 10, 3), 1);
        assert_eq!(cart.total_items(), 1);
    }
}
