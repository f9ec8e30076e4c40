//! Core value types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use id::{CategoryId, ProductId};
pub use price::{CurrencyCode, Price, group_thousands};
