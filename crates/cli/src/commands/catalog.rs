//! Catalog browsing commands.

use bazaar_core::{CurrencyCode, Money, ProductId};
use bazaar_storefront::catalog::{Product, filter};
use bazaar_storefront::db::DocumentStore;
use bazaar_storefront::state::AppState;

use super::{CommandError, print_json};
use crate::CatalogArgs;

fn print_product(product: &Product, currency: CurrencyCode) {
    let stock = if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "sold out".to_string()
    };
    println!(
        "{:<40} {:>14}  {:<12} {:<10} {}",
        product.id.to_string(),
        Money::new(product.price, currency).to_string(),
        product.category().label(),
        stock,
        product.name,
    );
}

/// List the catalog with the category, search, and featured filters applied.
///
/// # Errors
///
/// Returns an error if the catalog cannot be aggregated.
pub async fn list<S: DocumentStore + 'static>(
    state: &AppState<S>,
    args: &CatalogArgs,
) -> Result<(), CommandError> {
    let catalog = state.catalog();
    let products = if args.refresh {
        catalog.refresh().await?
    } else {
        catalog.products().await?
    };

    let selected: Vec<&Product> = if args.featured {
        let ids = catalog.featured_ids().await;
        filter::featured(&products, &ids)
    } else {
        let by_category = filter::filter_by_category(&products, args.category);
        let searched = filter::filter_by_search(
            by_category,
            args.search.as_deref().unwrap_or_default(),
        );
        searched
            .into_iter()
            .filter(|product| args.include_sold_out || filter::in_stock(product))
            .collect()
    };

    if args.json {
        return print_json(&selected);
    }

    if selected.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in &selected {
        print_product(product, state.config().currency);
    }
    println!("{} product(s)", selected.len());
    Ok(())
}

/// Show one product with the names of the stores that carry it.
///
/// # Errors
///
/// Returns an error if the product does not exist or cannot be read.
pub async fn show<S: DocumentStore + 'static>(
    state: &AppState<S>,
    id: &str,
    json: bool,
) -> Result<(), CommandError> {
    let id = ProductId::decode(id);
    let catalog = state.catalog();

    // A merged listing knows every store carrying it; fall back to the
    // id's own store when the product is not in the current snapshot.
    let products = catalog.products().await.ok();
    let locations = products
        .as_ref()
        .and_then(|products| products.iter().find(|p| p.id == id))
        .map(|product| product.store_locations.clone());

    let detail = catalog.product_detail(&id, locations.as_deref()).await?;

    if json {
        return print_json(&detail);
    }

    let product = &detail.product;
    println!("{}", product.name);
    println!("  Id:         {}", product.id);
    println!(
        "  Price:      {}",
        Money::new(product.price, state.config().currency)
    );
    println!("  Category:   {}", product.category().label());
    println!("  Stock:      {}", product.stock);
    if let Some(color) = &product.color {
        println!("  Color:      {color}");
    }
    if let Some(storage) = &product.storage {
        println!("  Storage:    {storage}");
    }
    if !product.description.is_empty() {
        println!("  About:      {}", product.description);
    }
    for url in &product.image_urls {
        println!("  Image:      {url}");
    }
    if !detail.store_names.is_empty() {
        println!("  Available at: {}", detail.store_names.join(", "));
    }
    Ok(())
}
