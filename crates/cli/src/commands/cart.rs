//! Cart commands. The cart persists to `BAZAAR_CART_PATH` between runs.

use bazaar_core::{CurrencyCode, Money, ProductId};
use bazaar_storefront::cart::{Cart, CartStorage, FileCartStorage, NewCartItem};
use bazaar_storefront::catalog::Product;
use bazaar_storefront::db::DocumentStore;
use bazaar_storefront::error::add_breadcrumb;
use bazaar_storefront::state::AppState;
use tracing::info;

use super::CommandError;
use crate::CartAction;

/// The cart backed by the configured file.
pub fn open<S: DocumentStore + 'static>(state: &AppState<S>) -> Cart<FileCartStorage> {
    Cart::load(FileCartStorage::new(state.config().cart_path.clone()))
}

/// Print every line and the subtotal.
pub fn print_cart<P: CartStorage>(cart: &Cart<P>, currency: CurrencyCode) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:<40} {:>3} x {:>14} = {:>14}  {}",
            item.product_id.to_string(),
            item.quantity,
            Money::new(item.price, currency).to_string(),
            Money::new(item.line_total(), currency).to_string(),
            item.name,
        );
    }
    println!(
        "{} item(s), subtotal {}",
        cart.total_items(),
        Money::new(cart.subtotal(), currency)
    );
}

/// The listing to add: the merged catalog entry when present, so stock
/// covers every store carrying it, otherwise a direct read.
async fn find_product<S: DocumentStore + 'static>(
    state: &AppState<S>,
    id: &ProductId,
) -> Result<Product, CommandError> {
    let catalog = state.catalog();
    if let Ok(products) = catalog.products().await
        && let Some(product) = products.iter().find(|p| &p.id == id)
    {
        return Ok(product.clone());
    }
    Ok(catalog.product_detail(id, None).await?.product)
}

/// Apply one cart action and print the result.
///
/// # Errors
///
/// Returns an error if a product being added cannot be found.
pub async fn run<S: DocumentStore + 'static>(
    state: &AppState<S>,
    action: CartAction,
) -> Result<(), CommandError> {
    let mut cart = open(state);

    match action {
        CartAction::Add { id, quantity } => {
            let id = ProductId::decode(&id);
            let product = find_product(state, &id).await?;
            if !product.in_stock() {
                println!("{} is sold out.", product.name);
                return Ok(());
            }
            cart.add(NewCartItem::from(&product), quantity);
            let product_id = id.to_string();
            add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
            info!(product_id = %id, quantity, "Added to cart");
        }
        CartAction::Remove { id } => cart.remove(&ProductId::decode(&id)),
        CartAction::Set { id, quantity } => cart.set_quantity(&ProductId::decode(&id), quantity),
        CartAction::Clear => cart.clear(),
        CartAction::Show => {}
    }

    print_cart(&cart, state.config().currency);
    Ok(())
}
