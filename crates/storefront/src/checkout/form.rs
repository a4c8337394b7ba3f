//! Contact and delivery form.

use serde::Deserialize;

use bazaar_core::Email;

use super::error::ValidationError;
use crate::orders::CustomerInfo;

/// Raw checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl CheckoutForm {
    /// Validate the form and build the customer details stored on orders.
    ///
    /// Name, address, city and country are required; phone is optional. The
    /// address parts are joined with `", "`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` naming the first blank
    /// required field.
    pub fn validate(&self, email: Option<&Email>) -> Result<CustomerInfo, ValidationError> {
        let required = [
            ("Full name", &self.full_name),
            ("Address", &self.address),
            ("City", &self.city),
            ("Country", &self.country),
        ];
        if let Some(&(label, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ValidationError::MissingField(label));
        }

        let address = [&self.address, &self.city, &self.country]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let phone = self.phone.trim();

        Ok(CustomerInfo {
            name: self.full_name.trim().to_owned(),
            phone: (!phone.is_empty()).then(|| phone.to_owned()),
            email: email.map(ToString::to_string),
            address: (!address.is_empty()).then_some(address),
        })
    }
}
