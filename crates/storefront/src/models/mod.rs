//! Domain models for the storefront.

pub mod customer;

pub use customer::Customer;
