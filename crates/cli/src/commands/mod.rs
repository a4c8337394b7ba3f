//! Command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod migrate;
pub mod orders;
pub mod seed;

use serde::Serialize;
use thiserror::Error;

use bazaar_core::{CustomerId, Email, IdError};
use bazaar_storefront::catalog::CatalogError;
use bazaar_storefront::checkout::CheckoutError;
use bazaar_storefront::error::StorefrontError;
use bazaar_storefront::models::Customer;
use bazaar_storefront::orders::HistoryError;

/// Errors from store-backed commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

macro_rules! storefront_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for CommandError {
                fn from(err: $source) -> Self {
                    Self::Storefront(err.into())
                }
            }
        )*
    };
}

storefront_error_from!(CatalogError, CheckoutError, HistoryError);

impl From<IdError> for CommandError {
    fn from(err: IdError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Build the customer from command-line arguments.
fn customer(id: &str, email: Option<&str>) -> Result<Customer, CommandError> {
    let id = CustomerId::parse(id)?;
    let email = email
        .map(Email::parse)
        .transpose()
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    Ok(Customer::new(id, email))
}

/// Pretty-print a value as JSON.
fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
