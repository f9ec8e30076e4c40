//! Display data handed to templates.
//!
//! Templates never see domain types directly; prices arrive preformatted and
//! every page gets the same [`Chrome`] for its header, cart panel and toast.

use aura_core::{Catalog, Category, Clock, LineItem, Product};

use crate::cart_session::SessionCart;
use crate::state::AppState;

/// Product card display data.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub image: String,
    pub notes: String,
    pub stars: String,
    pub reviews: u32,
    pub badge: Option<String>,
    pub badge_class: String,
    pub category: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            original_price: product
                .original_price
                .filter(|_| product.is_discounted())
                .map(|p| p.display()),
            image: product.image.clone(),
            notes: product.notes.clone(),
            stars: stars(product.rating),
            reviews: product.reviews,
            badge: product.badge.clone(),
            badge_class: product
                .badge_type
                .as_deref()
                .map_or_else(|| "badge".to_string(), |kind| format!("badge badge-{kind}")),
            category: product.category.to_string(),
        }
    }
}

impl ProductCard {
    /// Cards for a list of products.
    pub fn list<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<Self> {
        products.into_iter().map(Self::from).collect()
    }
}

/// Five stars, filled up to `rating`.
#[must_use]
pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Cart line display data.
#[derive(Clone)]
pub struct LineView {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub qty: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&LineItem> for LineView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            qty: item.qty,
            unit_price: item.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Category navigation link.
#[derive(Clone)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl From<&Category> for NavLink {
    fn from(category: &Category) -> Self {
        Self {
            label: category.name.clone(),
            href: format!("/category/{}", category.id),
        }
    }
}

impl From<&Product> for NavLink {
    fn from(product: &Product) -> Self {
        Self {
            label: product.name.clone(),
            href: format!("/product/{}", product.id),
        }
    }
}

/// Visible toast and how long it has left.
#[derive(Clone)]
pub struct ToastView {
    pub message: String,
    pub remaining_ms: i64,
}

/// Everything the shared layout renders around a page.
#[derive(Clone)]
pub struct Chrome {
    pub nonce: String,
    /// Current path and query, used as the return target of cart forms.
    pub current: String,
    pub cart_count: u32,
    pub lines: Vec<LineView>,
    pub subtotal: String,
    pub panel_open: bool,
    pub toast: Option<ToastView>,
    pub categories: Vec<NavLink>,
    pub bestsellers: Vec<NavLink>,
    pub new_arrivals: Vec<NavLink>,
}

impl Chrome {
    /// Chrome for a page showing `cart`.
    #[must_use]
    pub fn new(state: &AppState, cart: &SessionCart, nonce: String, current: &str) -> Self {
        let now = state.clock().now();
        let toast = cart.ui().toast.map(|toast| ToastView {
            remaining_ms: toast.remaining(now).num_milliseconds(),
            message: toast.message,
        });

        Self {
            nonce,
            current: current.to_string(),
            cart_count: cart.count(),
            lines: cart.items().iter().map(LineView::from).collect(),
            subtotal: cart.total().display(),
            panel_open: cart.is_panel_open(),
            toast,
            ..Self::navigation(state.catalog())
        }
    }

    /// Chrome with navigation only and an empty cart.
    #[must_use]
    pub fn navigation(catalog: &Catalog) -> Self {
        Self {
            nonce: String::new(),
            current: "/".to_string(),
            cart_count: 0,
            lines: Vec::new(),
            subtotal: aura_core::Price::ZERO.display(),
            panel_open: false,
            toast: None,
            categories: catalog.categories.iter().map(NavLink::from).collect(),
            bestsellers: catalog.bestsellers().into_iter().map(NavLink::from).collect(),
            new_arrivals: catalog.new_arrivals().into_iter().map(NavLink::from).collect(),
        }
    }
}
