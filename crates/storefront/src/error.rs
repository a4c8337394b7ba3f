//! Unified error handling with Sentry integration.
//!
//! Provides a unified `StorefrontError` that front ends report through
//! [`StorefrontError::report`] before showing the customer
//! [`StorefrontError::user_message`].

use thiserror::Error;

use crate::cart::CartStorageError;
use crate::catalog::CatalogError;
use crate::checkout::{AssignmentError, CheckoutError};
use crate::config::ConfigError;
use crate::db::StoreError;
use crate::orders::HistoryError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog aggregation or lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Placing an order failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Reading order history failed.
    #[error("Order history error: {0}")]
    History(#[from] HistoryError),

    /// Cart persistence failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartStorageError),

    /// Document database operation failed.
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

impl StorefrontError {
    /// Whether the failure is ours rather than the customer's input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Config(_)
            | Self::Checkout(CheckoutError::Validation(_) | CheckoutError::Assignment(_)) => false,
            Self::Catalog(err) => !matches!(
                err,
                CatalogError::NotFound(_) | CatalogError::Configuration(_)
            ),
            Self::History(err) => !matches!(err, HistoryError::NotFound),
            Self::Checkout(CheckoutError::Write(_)) | Self::Cart(_) | Self::Store(_) => true,
        }
    }

    /// Capture server errors to Sentry and log them.
    ///
    /// Customer-input and configuration errors are not captured.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }

    /// A message safe to show the customer.
    ///
    /// Internal details are never exposed; validation messages are shown
    /// as-is because they tell the customer what to fix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "The store is not configured correctly.".to_string(),
            Self::Catalog(CatalogError::NotFound(_)) | Self::History(HistoryError::NotFound) => {
                "Not found.".to_string()
            }
            Self::Catalog(CatalogError::Configuration(_)) => {
                "No stores are configured.".to_string()
            }
            Self::Catalog(_) => "Products could not be loaded. Please try again.".to_string(),
            Self::Checkout(CheckoutError::Validation(err)) => err.to_string(),
            Self::Checkout(CheckoutError::Assignment(AssignmentError::EmptyCart)) => {
                AssignmentError::EmptyCart.to_string()
            }
            Self::Checkout(CheckoutError::Assignment(_)) => {
                "Some items in your cart are no longer available.".to_string()
            }
            Self::Checkout(CheckoutError::Write(_)) => {
                "Failed to place order. Please try again.".to_string()
            }
            Self::History(_) | Self::Cart(_) | Self::Store(_) => {
                "Internal error. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context from a customer ID.
///
/// Call this once the customer is known to associate errors with them.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for customer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "ownerA|s1|d1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::ConfigurationError;
    use crate::checkout::{ValidationError, WriteError, WriteStage};
    use bazaar_core::StoreRef;

    fn write_error() -> StorefrontError {
        let store = StoreRef::parse("ownerA", "s1").unwrap();
        StorefrontError::Checkout(
            WriteError {
                stage: WriteStage::Order,
                store,
                order_number: "#WW-1".to_string(),
                completed: Vec::new(),
                orphaned_order_id: None,
                skipped: Vec::new(),
                source: StoreError::Unavailable {
                    collection: "users/ownerA/stores/s1/websiteOrders".to_string(),
                    message: "connection reset by 10.0.0.7".to_string(),
                },
            }
            .into(),
        )
    }

    #[test]
    fn test_display() {
        let err = StorefrontError::Catalog(CatalogError::NotFound("d1".to_string()));
        assert!(err.to_string().starts_with("Catalog error:"));
    }

    #[test]
    fn test_write_failure_message_is_generic() {
        let err = write_error();
        assert!(err.is_server_error());
        assert_eq!(err.user_message(), "Failed to place order. Please try again.");
        assert!(!err.user_message().contains("10.0.0.7"));
    }

    #[test]
    fn test_validation_messages_are_shown() {
        let err = StorefrontError::Checkout(ValidationError::MissingField("City").into());
        assert!(!err.is_server_error());
        assert_eq!(err.user_message(), "City is required.");
    }

    #[test]
    fn test_classification() {
        assert!(
            !StorefrontError::Catalog(CatalogError::NotFound("x".to_string())).is_server_error()
        );
        assert!(
            !StorefrontError::Catalog(ConfigurationError::NoStores.into()).is_server_error()
        );
        assert!(!StorefrontError::History(HistoryError::NotFound).is_server_error());
        assert!(
            !StorefrontError::Config(ConfigError::MissingEnvVar("X".to_string()))
                .is_server_error()
        );
    }
}
