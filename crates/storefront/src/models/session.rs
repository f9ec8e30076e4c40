//! Session-related types.
//!
//! The visitor's session is the storefront's client-local storage: it holds
//! the cart snapshot, the cart panel state and the checkout token.

/// Session keys for storefront data.
pub mod keys {
    /// Key for the cart snapshot, a JSON array of line items.
    pub const CART: &str = "auraCart";

    /// Key for the cart panel flag and current toast.
    pub const CART_UI: &str = "auraCartUi";

    /// Key for the one-time checkout submission token.
    pub const CHECKOUT_TOKEN: &str = "checkoutToken";
}
