//! Tokoku Core - Shared domain types and business rules.
//!
//! This crate provides the types used across all Tokoku components:
//! - `web` - The dashboard, marketing site, and JSON API
//! - `cli` - Command-line tools for migrations, users, and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Cart arithmetic, list filtering, sorting, and stock
//! buckets live here so they can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, rupiah amounts, emails, and status enums
//! - [`product`] - Inventory records, filters, and summaries
//! - [`transaction`] - Sales records, filters, and summaries
//! - [`cart`] - The point-of-sale cart
//! - [`chat`] - Assistant sessions and messages
//! - [`validation`] - Input validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod chat;
pub mod product;
pub mod transaction;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine};
pub use chat::{ChatMessage, ChatSession};
pub use product::{InventorySummary, Product, ProductFilter, ProductInput};
pub use transaction::{
    LineItem, NewTransaction, SalesSummary, Transaction, TransactionFilter, TransactionInput,
};
pub use types::*;
pub use validation::ValidationError;
