//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory scenarios
//! cargo test -p bazaar-integration-tests
//!
//! # PostgreSQL round trips (requires a migrated database)
//! BAZAAR_TEST_DATABASE_URL=postgres://... cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `scenarios` - End-to-end catalog, cart, checkout, and history flows
//! - `properties` - Cart bounds, payment allocation, and image resolution
//! - `postgres` - `PgDocumentStore` against a live database

use std::collections::HashMap;

use bazaar_core::{CustomerId, Email, StoreRef};
use bazaar_storefront::checkout::{CheckoutForm, MobileMoneyForm, PaymentInput};
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::db::MemoryDocumentStore;
use bazaar_storefront::models::Customer;
use bazaar_storefront::state::AppState;

/// Two stores sharing an iPhone 13 listing; see `fixtures/two_stores.yaml`.
pub const TWO_STORES: &str = include_str!("../fixtures/two_stores.yaml");

/// Errors from building a test context.
pub type SetupError = Box<dyn std::error::Error>;

/// Parse a store pair.
///
/// # Errors
///
/// Returns an error if either id is blank or contains the separator.
pub fn store(owner: &str, id: &str) -> Result<StoreRef, SetupError> {
    Ok(StoreRef::parse(owner, id)?)
}

/// Build an in-memory document store from a YAML fixture.
///
/// # Errors
///
/// Returns an error if the fixture is not valid YAML or is not shaped as
/// collections of documents.
pub fn fixture_store(yaml: &str) -> Result<MemoryDocumentStore, SetupError> {
    let seed: serde_json::Value = serde_yaml::from_str(yaml)?;
    Ok(MemoryDocumentStore::from_seed(seed)?)
}

/// Configuration for a set of `owner:store` pairs.
///
/// Tests hand carts their own storage, so the configured cart path is never
/// touched.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn config(pos_stores: &str) -> Result<StorefrontConfig, SetupError> {
    let vars: HashMap<&str, String> = HashMap::from([("POS_STORES", pos_stores.to_string())]);
    Ok(StorefrontConfig::from_source(|key| vars.get(key).cloned())?)
}

/// Application state over an in-memory store.
///
/// # Errors
///
/// See [`config`].
pub fn app(
    pos_stores: &str,
    db: MemoryDocumentStore,
) -> Result<AppState<MemoryDocumentStore>, SetupError> {
    Ok(AppState::new(config(pos_stores)?, db))
}

/// A signed-in customer.
///
/// # Errors
///
/// Returns an error if the id or email is invalid.
pub fn customer(id: &str, email: Option<&str>) -> Result<Customer, SetupError> {
    Ok(Customer::new(
        CustomerId::parse(id)?,
        email.map(Email::parse).transpose()?,
    ))
}

/// A complete contact form.
#[must_use]
pub fn checkout_form() -> CheckoutForm {
    CheckoutForm {
        full_name: "Ama Mensah".to_string(),
        phone: "0244000000".to_string(),
        address: "12 Oxford St".to_string(),
        city: "Accra".to_string(),
        country: "Ghana".to_string(),
    }
}

/// A mobile-money declaration.
#[must_use]
pub fn mobile_money(amount: &str, acknowledge_partial: bool) -> PaymentInput {
    PaymentInput::MobileMoney(MobileMoneyForm {
        payment_reference: "MP240101.1234.A56789".to_string(),
        sender_name: "Ama Mensah".to_string(),
        amount_sent: amount.to_string(),
        acknowledge_partial,
    })
}
