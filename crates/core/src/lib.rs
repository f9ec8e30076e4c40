//! Aura Core - cart lifecycle and catalog logic for the Aura Sentiments
//! storefront.
//!
//! # Architecture
//!
//! The core crate does no I/O: no HTTP, no files, no clocks it does not
//! receive. The storefront supplies the session-backed [`SnapshotSlot`] and
//! the [`Clock`]; tests supply in-memory ones.
//!
//! # Modules
//!
//! - [`cart`] - The cart store, its line items and the observer seam
//! - [`snapshot`] - Mirroring the cart into a durable slot and restoring it
//! - [`toast`] - Deadline-based transient notifications
//! - [`catalog`] - Products, categories and banners
//! - [`query`] - Search, filter and sort over the catalog
//! - [`checkout`] - Contact details, order payload and totals
//! - [`types`] - Newtype wrappers for ids, prices and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod query;
pub mod snapshot;
pub mod toast;
pub mod types;

pub use cart::{CartObserver, CartStore, CartUi, LineItem};
pub use catalog::{Banner, Catalog, Category, Product};
pub use checkout::{CheckoutData, ContactError, ContactInfo, OrderTotals};
pub use query::{CatalogQuery, CategoryFilter, SortMode};
pub use snapshot::{MemorySlot, SlotError, SnapshotError, SnapshotPersister, SnapshotSlot};
pub use toast::{Clock, ManualClock, SystemClock, Toast};
pub use types::*;
