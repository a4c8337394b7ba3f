//! Order documents and the per-customer order index.
//!
//! One [`Order`] is written per store under
//! `users/{ownerId}/stores/{storeId}/websiteOrders`, and one [`OrderRef`]
//! per order under `users/{customerId}/orderRefs` so a customer's orders can
//! be listed without knowing which stores they bought from.
//!
//! Money is stored as JSON numbers, which is what the POS reads.

pub mod history;

pub use history::{HistoryError, OrderHistory, OrderView, has_pending_orders};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{CurrencyCode, OrderStatus, PaymentMethod, PaymentStatus, StoreRef};

/// Prefix of every storefront order number.
pub const ORDER_NUMBER_PREFIX: &str = "#WW-";

/// Checkout-wide order number base, derived from the checkout time.
#[must_use]
pub fn base_order_number(placed_at: DateTime<Utc>) -> String {
    format!("{ORDER_NUMBER_PREFIX}{}", placed_at.timestamp_millis())
}

/// Order number of the `index`-th (0-based) of `count` orders in one
/// checkout. A lone order keeps the bare base.
#[must_use]
pub fn order_number(base: &str, index: usize, count: usize) -> String {
    if count > 1 {
        format!("{base}-{}", index + 1)
    } else {
        base.to_owned()
    }
}

/// A line item as stored on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Store-local inventory document id.
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Contact and delivery details copied onto every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// An order document for one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: String,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub customer_info: CustomerInfo,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_sender_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Index entry pointing from a customer to one of their store orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    #[serde(flatten)]
    pub store: StoreRef,
    pub order_id: String,
    pub order_number: String,
    pub created_at: DateTime<Utc>,
}
