//! Checkout failures.

use std::fmt;

use thiserror::Error;

use bazaar_core::{ProductId, StoreRef};

use super::writer::CommittedOrder;
use crate::db::StoreError;

/// Input the customer must correct before the order can be placed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("Payment reference is required.")]
    MissingPaymentReference,

    #[error("Sender name is required.")]
    MissingSenderName,

    #[error("Please enter a valid amount sent.")]
    InvalidAmount,

    /// Partial mobile-money payment without the customer's acknowledgement.
    #[error("{message} Please confirm the partial payment to place your order.")]
    PartialPaymentNotAcknowledged { message: String },
}

/// The cart cannot be mapped onto stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("Your cart is empty.")]
    EmptyCart,

    /// A bare product id with no configured store to fall back to.
    #[error("Could not assign {product_id} to a store.")]
    Unassignable { product_id: ProductId },
}

/// Which write in a store's pair failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Order,
    OrderRef,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Order => "order",
            Self::OrderRef => "order ref",
        })
    }
}

/// A write failed partway through a checkout.
///
/// Nothing already written is rolled back. `completed` lists the stores
/// whose order and ref were both written, `orphaned_order_id` is set when the
/// failing store's order exists without a ref, and `skipped` lists the stores
/// that were never attempted.
#[derive(Debug, Error)]
#[error("failed to write {stage} {order_number} for store {store}: {source}")]
pub struct WriteError {
    pub stage: WriteStage,
    pub store: StoreRef,
    pub order_number: String,
    pub completed: Vec<CommittedOrder>,
    pub orphaned_order_id: Option<String>,
    pub skipped: Vec<StoreRef>,
    #[source]
    pub source: StoreError,
}

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Write(#[from] Box<WriteError>),
}

impl From<WriteError> for CheckoutError {
    fn from(err: WriteError) -> Self {
        Self::Write(Box::new(err))
    }
}
