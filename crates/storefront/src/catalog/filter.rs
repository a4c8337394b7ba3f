//! Browsing filters applied to an aggregated catalog.

use bazaar_core::{CategoryFilter, ProductId};

use super::Product;

/// Number of listings shown in the featured strip.
pub const FEATURED_LIMIT: usize = 10;

/// Whether a product can be put in a cart.
#[must_use]
pub const fn in_stock(product: &Product) -> bool {
    product.stock > 0
}

/// Products in the selected category tab.
#[must_use]
pub fn filter_by_category<'a>(products: &'a [Product], tab: CategoryFilter) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|product| tab.matches(product.category()))
        .collect()
}

/// Case-insensitive substring search over name and description.
///
/// A blank query matches everything.
#[must_use]
pub fn filter_by_search<'a, I>(products: I, query: &str) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    let needle = query.trim().to_lowercase();
    products
        .into_iter()
        .filter(|product| {
            needle.is_empty()
                || product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// The featured strip: merchandised ids resolved against in-stock listings,
/// in merchandising order. Without merchandised ids the first in-stock
/// listings are shown instead.
#[must_use]
pub fn featured<'a>(products: &'a [Product], featured_ids: &[ProductId]) -> Vec<&'a Product> {
    let available = products.iter().filter(|p| in_stock(p));
    if featured_ids.is_empty() {
        return available.take(FEATURED_LIMIT).collect();
    }

    let available: Vec<&Product> = available.collect();
    featured_ids
        .iter()
        .filter_map(|id| available.iter().copied().find(|p| &p.id == id))
        .take(FEATURED_LIMIT)
        .collect()
}
