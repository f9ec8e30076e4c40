//! Business logic services for storefront.
//!
//! # Services
//!
//! - `mail` - Order notification mail through the SMTP relay
//! - `whatsapp` - Pre-filled message-app link for relaying an order

pub mod mail;
pub mod whatsapp;

pub use mail::{DisabledNotifier, MailRelay, NotifyError, OrderNotifier};
