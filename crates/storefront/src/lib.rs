//! Bazaar Storefront library.
//!
//! Aggregates inventory from one or more POS stores into a single catalog,
//! keeps a stock-bounded cart, and splits checkouts into one order per
//! owning store with the payment apportioned between them.
//!
//! # Modules
//!
//! - [`catalog`] - Normalization, multi-store aggregation, filters, product detail
//! - [`cart`] - Session cart with clamp-and-persist mutations
//! - [`checkout`] - Form and payment validation, order splitting, order writes
//! - [`orders`] - Order documents and customer order history
//! - [`db`] - Document store interface with in-memory and `PostgreSQL` backends

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod orders;
pub mod state;
