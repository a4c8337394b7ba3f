//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `storefront` - Catalog aggregation, cart, checkout, and order history
//! - `cli` - Command-line tools for migrations and operating the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, composite product ids, money, statuses, emails,
//!   and the category classifier

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
