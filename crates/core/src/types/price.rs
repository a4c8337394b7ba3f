//! Type-safe money representation using decimal arithmetic.
//!
//! All storefront amounts are `rust_decimal::Decimal` in the currency's
//! standard unit (cedis, dollars). Rounding to two places uses
//! midpoint-away-from-zero, which for the non-negative amounts handled here
//! is the familiar "round half up".

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round an amount to two decimal places (half away from zero).
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// An amount together with its currency, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., cedis, not pesewas).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Shorthand for an amount in Ghana cedis.
    #[must_use]
    pub const fn cedis(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::GHS)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.2}",
            self.currency_code.symbol(),
            round_money(self.amount)
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    GHS,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display prefix for amounts in this currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::GHS => "GH₵",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::GHS => "GHS",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GHS" => Ok(Self::GHS),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec("1.005")), dec("1.01"));
        assert_eq!(round_money(dec("1.004")), dec("1.00"));
        assert_eq!(round_money(dec("2400")), dec("2400"));
    }

    #[test]
    fn test_display_cedis() {
        assert_eq!(Money::cedis(dec("9000")).to_string(), "GH₵9000.00");
        assert_eq!(Money::cedis(dec("12.5")).to_string(), "GH₵12.50");
    }

    #[test]
    fn test_display_usd() {
        let money = Money::new(dec("3.456"), CurrencyCode::USD);
        assert_eq!(money.to_string(), "$3.46");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("ghs".parse::<CurrencyCode>().unwrap(), CurrencyCode::GHS);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_serde() {
        let json = serde_json::to_string(&CurrencyCode::GHS).unwrap();
        assert_eq!(json, "\"GHS\"");
    }
}
