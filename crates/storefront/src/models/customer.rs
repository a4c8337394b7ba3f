//! The signed-in customer, as supplied by the authentication layer.

use bazaar_core::{CustomerId, Email};

/// A customer placing or viewing orders.
///
/// Only a stable opaque id and an optional email are needed; sign-in itself
/// happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Option<Email>,
}

impl Customer {
    #[must_use]
    pub const fn new(id: CustomerId, email: Option<Email>) -> Self {
        Self { id, email }
    }
}
