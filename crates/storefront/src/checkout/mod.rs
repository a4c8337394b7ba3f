//! Checkout: validate, split per store, allocate payment, write.
//!
//! # Flow
//!
//! 1. Reject an empty cart
//! 2. Validate the contact form and the payment declaration
//! 3. Split cart lines into one group per owning store
//! 4. Write each store's order and the customer's ref, in group order
//! 5. Clear the cart, only when every write succeeded
//!
//! A failed write leaves the cart untouched so the customer can retry, and
//! the error says which orders already exist.

mod error;
mod form;
mod payment;
mod split;
mod writer;

pub use error::{
    AssignmentError, CheckoutError, ValidationError, WriteError, WriteStage,
};
pub use form::CheckoutForm;
pub use payment::{
    Allocation, MAX_AMOUNT_SENT, MobileMoneyForm, MobileMoneyPayment, Payment, PaymentInput,
    allocate, validate_mobile_money, validate_payment,
};
pub use split::{StoreOrderGroup, split};
pub use writer::{CommitRequest, CommittedOrder, commit};

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use bazaar_core::{CurrencyCode, StoreRef};

use crate::cart::{Cart, CartStorage};
use crate::db::DocumentStore;
use crate::models::Customer;
use crate::orders::base_order_number;

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    /// Shared base of the order numbers.
    pub order_number: String,
    pub orders: Vec<CommittedOrder>,
    /// Payment message for mobile money, `None` for cash.
    pub payment_message: Option<String>,
}

/// Places orders against the configured stores.
pub struct Checkout<S> {
    db: Arc<S>,
    stores: Vec<StoreRef>,
    currency: CurrencyCode,
}

impl<S: DocumentStore> Checkout<S> {
    #[must_use]
    pub const fn new(db: Arc<S>, stores: Vec<StoreRef>, currency: CurrencyCode) -> Self {
        Self {
            db,
            stores,
            currency,
        }
    }

    /// Place the cart's orders.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::Assignment` for an empty or unassignable cart
    /// - `CheckoutError::Validation` for form or payment problems
    /// - `CheckoutError::Write` when a write fails; earlier writes persist
    #[instrument(skip_all, fields(customer_id = %customer.id, lines = cart.items().len()))]
    pub async fn place_order<P: CartStorage>(
        &self,
        cart: &mut Cart<P>,
        customer: &Customer,
        form: &CheckoutForm,
        payment: &PaymentInput,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if cart.is_empty() {
            return Err(AssignmentError::EmptyCart.into());
        }

        let customer_info = form.validate(customer.email.as_ref())?;
        let payment = validate_payment(payment, cart.subtotal())?;
        let groups = split(cart.items(), &self.stores)?;

        let placed_at = Utc::now();
        let request = CommitRequest {
            customer,
            customer_info: &customer_info,
            payment: &payment,
            currency: self.currency,
            placed_at,
        };
        let orders = commit(self.db.as_ref(), &groups, &request).await?;

        cart.clear();
        info!(orders = orders.len(), method = %payment.method(), "Checkout complete");

        Ok(CheckoutReceipt {
            order_number: base_order_number(placed_at),
            orders,
            payment_message: match payment {
                Payment::MobileMoney(momo) => Some(momo.message),
                Payment::Cash => None,
            },
        })
    }
}
