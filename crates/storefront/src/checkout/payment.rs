//! Payment validation and per-store allocation.
//!
//! Mobile money is sent before the order is placed and the customer declares
//! the reference, sender and amount. Cash is settled in person at each
//! store, so cash orders are always unpaid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{Money, PaymentMethod, PaymentStatus, round_money};

use super::error::ValidationError;
use super::split::StoreOrderGroup;

/// Raw mobile-money fields as typed by the customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileMoneyForm {
    pub payment_reference: String,
    pub sender_name: String,
    /// Free text; thousands separators are allowed.
    pub amount_sent: String,
    /// The customer accepts paying the balance before delivery.
    #[serde(default)]
    pub acknowledge_partial: bool,
}

/// Payment choice as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInput {
    Cash,
    MobileMoney(MobileMoneyForm),
}

/// A validated mobile-money declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileMoneyPayment {
    pub reference: String,
    pub sender_name: String,
    /// Rounded to two decimal places.
    pub amount_sent: Decimal,
    pub is_partial: bool,
    /// What the customer is told about the payment.
    pub message: String,
}

/// A validated payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payment {
    Cash,
    MobileMoney(MobileMoneyPayment),
}

impl Payment {
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::Cash => PaymentMethod::Cash,
            Self::MobileMoney(_) => PaymentMethod::MobileMoney,
        }
    }

    /// The amount declared as sent; zero for cash.
    #[must_use]
    pub const fn amount_sent(&self) -> Decimal {
        match self {
            Self::Cash => Decimal::ZERO,
            Self::MobileMoney(payment) => payment.amount_sent,
        }
    }
}

/// What one store's order records as paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// Group total rounded to two decimal places.
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub payment_status: PaymentStatus,
}

/// Largest amount a customer can declare as sent.
pub const MAX_AMOUNT_SENT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty()
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }
    cleaned
        .parse::<Decimal>()
        .ok()
        .map(round_money)
        .filter(|amount| *amount > Decimal::ZERO && *amount <= MAX_AMOUNT_SENT)
}

/// `round(amount × total / subtotal, 2)`. Products too large to represent
/// are scaled by the ratio first; a zero subtotal gets nothing.
fn share(amount: Decimal, total: Decimal, subtotal: Decimal) -> Decimal {
    amount
        .checked_mul(total)
        .and_then(|scaled| scaled.checked_div(subtotal))
        .or_else(|| {
            total
                .checked_div(subtotal)
                .and_then(|ratio| amount.checked_mul(ratio))
        })
        .map_or(Decimal::ZERO, round_money)
}

/// Validate a mobile-money declaration against the cart subtotal.
///
/// An amount below the subtotal is a partial payment; it is accepted only
/// when the customer has acknowledged it.
///
/// # Errors
///
/// Returns `ValidationError` when the reference or sender name is blank,
/// the amount is not a positive number up to [`MAX_AMOUNT_SENT`], or a
/// partial payment has not been acknowledged. The last carries the message
/// quoting the shortfall.
pub fn validate_mobile_money(
    form: &MobileMoneyForm,
    subtotal: Decimal,
) -> Result<MobileMoneyPayment, ValidationError> {
    let reference = form.payment_reference.trim();
    if reference.is_empty() {
        return Err(ValidationError::MissingPaymentReference);
    }
    let sender_name = form.sender_name.trim();
    if sender_name.is_empty() {
        return Err(ValidationError::MissingSenderName);
    }
    let amount_sent = parse_amount(&form.amount_sent).ok_or(ValidationError::InvalidAmount)?;

    let is_partial = amount_sent < subtotal;
    let message = if is_partial {
        let balance = round_money(subtotal - amount_sent);
        format!(
            "You have sent a partial amount ({}). Please pay the balance of {} at the shop or send the full amount before your order can be delivered.",
            Money::cedis(amount_sent),
            Money::cedis(balance),
        )
    } else {
        "Full amount entered. Order will be confirmed once payment is verified.".to_string()
    };

    if is_partial && !form.acknowledge_partial {
        return Err(ValidationError::PartialPaymentNotAcknowledged { message });
    }

    Ok(MobileMoneyPayment {
        reference: reference.to_owned(),
        sender_name: sender_name.to_owned(),
        amount_sent,
        is_partial,
        message,
    })
}

/// Validate the submitted payment.
///
/// # Errors
///
/// See [`validate_mobile_money`]. Cash never fails.
pub fn validate_payment(input: &PaymentInput, subtotal: Decimal) -> Result<Payment, ValidationError> {
    match input {
        PaymentInput::Cash => Ok(Payment::Cash),
        PaymentInput::MobileMoney(form) => {
            validate_mobile_money(form, subtotal).map(Payment::MobileMoney)
        }
    }
}

/// Apportion the paid amount across store orders.
///
/// A single order receives the whole amount. Several orders each receive
/// `round(amount × round(total_i) / subtotal, 2)`, where the subtotal is the
/// sum of the group totals. An order is `paid` when its share covers its
/// rounded total, `partial` otherwise; cash orders are `unpaid` with nothing
/// paid.
#[must_use]
pub fn allocate(groups: &[StoreOrderGroup], payment: &Payment) -> Vec<Allocation> {
    let subtotal = groups
        .iter()
        .fold(Decimal::ZERO, |sum, g| sum.saturating_add(g.total));
    let amount = payment.amount_sent();
    let single = groups.len() == 1;

    groups
        .iter()
        .map(|group| {
            let total = round_money(group.total);
            if matches!(payment, Payment::Cash) {
                return Allocation {
                    total,
                    paid_amount: Decimal::ZERO,
                    payment_status: PaymentStatus::Unpaid,
                };
            }

            let paid_amount = if single {
                amount
            } else {
                share(amount, total, subtotal)
            };

            Allocation {
                total,
                paid_amount,
                payment_status: if paid_amount >= total {
                    PaymentStatus::Paid
                } else {
                    PaymentStatus::Partial
                },
            }
        })
        .collect()
}
