//! Checkout data: the shopper's contact details, the submitted order and its
//! totals.
//!
//! [`CheckoutData`] is the order submission payload:
//!
//! ```json
//! {
//!   "contactInfo": { "firstName": "...", "lastName": "...", "email": "...",
//!                    "phone": "...", "address": "...", "apartment": "...",
//!                    "city": "...", "postalCode": "..." },
//!   "cart": [ { "id": "...", "name": "...", "price": 2599, "qty": 1 } ],
//!   "total": 2698
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::LineItem;
use crate::types::{Email, EmailError, Price};

/// A contact field that failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// A required field was blank.
    #[error("{0} is required")]
    Missing(&'static str),

    /// The email address did not parse.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Shipping and contact details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
    pub city: String,
    pub postal_code: String,
}

impl ContactInfo {
    /// Check required fields and the email address.
    ///
    /// Returns the parsed email so callers need not parse it twice.
    ///
    /// # Errors
    ///
    /// Returns the first failing field, in form order.
    pub fn validate(&self) -> Result<Email, ContactError> {
        let required = [
            ("First name", &self.first_name),
            ("Last name", &self.last_name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Address", &self.address),
            ("City", &self.city),
            ("Postal code", &self.postal_code),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(ContactError::Missing(label));
            }
        }
        Ok(Email::parse(&self.email)?)
    }

    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// The apartment line, if one was entered.
    #[must_use]
    pub fn apartment(&self) -> Option<&str> {
        self.apartment
            .as_deref()
            .map(str::trim)
            .filter(|apt| !apt.is_empty())
    }
}

/// Subtotal, shipping and what the shopper pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Totals for `subtotal` with a flat `shipping_fee`. Empty orders ship free.
    #[must_use]
    pub fn compute(subtotal: Price, shipping_fee: Price) -> Self {
        let shipping = if subtotal.is_zero() {
            Price::ZERO
        } else {
            shipping_fee
        };
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// Totals for a list of lines.
    #[must_use]
    pub fn for_items(items: &[LineItem], shipping_fee: Price) -> Self {
        Self::compute(items.iter().map(LineItem::line_total).sum(), shipping_fee)
    }
}

/// A submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutData {
    pub contact_info: ContactInfo,
    pub cart: Vec<LineItem>,
    /// Final amount due, shipping included.
    pub total: Price,
}

impl CheckoutData {
    /// Assemble an order from the cart and computed totals.
    #[must_use]
    pub fn new(contact_info: ContactInfo, cart: Vec<LineItem>, totals: OrderTotals) -> Self {
        Self {
            contact_info,
            cart,
            total: totals.total,
        }
    }

    /// Sum of the line totals, without shipping.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cart.iter().map(LineItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }
}
