//! Status enums for orders and payments.
//!
//! Wire values match the documents the POS back office already reads:
//! lower-case statuses and the human-readable payment method names.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Orders are created `pending`; every later transition is made by the
/// owning store's staff in the POS, so unknown values are tolerated on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Ready,
    Completed,
    Cancelled,
    #[serde(other)]
    Other,
}

impl OrderStatus {
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// How much of an order has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Transfer made before the order is placed; reference and amount are declared.
    #[serde(rename = "Mobile Money")]
    MobileMoney,
    /// Settled in person at the store.
    #[serde(rename = "Cash")]
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MobileMoney => write!(f, "Mobile Money"),
            Self::Cash => write!(f, "Cash"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile money" | "mobile-money" | "momo" => Ok(Self::MobileMoney),
            "cash" => Ok(Self::Cash),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}
