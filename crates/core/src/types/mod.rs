//! Core types for the Bazaar storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use category::{Category, CategoryFilter, CategoryInput, classify};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Money, round_money};
pub use status::*;
