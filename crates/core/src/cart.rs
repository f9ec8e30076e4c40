//! The cart store.
//!
//! [`CartStore`] is the single owner of a shopper's cart for the active
//! session. Views never touch the line items directly: every change goes
//! through the operations below, and after each one the store hands the full
//! item list to its subscribed [`CartObserver`]s. Persistence is one such
//! observer (see [`crate::snapshot`]), which keeps the store itself free of
//! any storage concern.
//!
//! # Invariants
//!
//! - At most one [`LineItem`] per product id. Adding an id that is already in
//!   the cart bumps its quantity instead of appending a second line.
//! - Every line has `qty >= 1`; setting a quantity of zero or less removes it.
//! - Lines keep the order in which their ids were first added.
//! - [`CartStore::count`] and [`CartStore::total`] are recomputed from the
//!   current lines on every call.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::toast::{Clock, SystemClock, Toast};
use crate::types::{Price, ProductId};

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub qty: u32,
}

impl LineItem {
    /// A fresh line with a quantity of one.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Price,
        image: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image,
            qty: 1,
        }
    }

    /// Set the quantity (builder style).
    #[must_use]
    pub const fn with_qty(mut self, qty: u32) -> Self {
        self.qty = qty;
        self
    }

    /// `price * qty` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty)
    }
}

/// Receives the full item list after every cart mutation.
pub trait CartObserver: Send + Sync {
    /// Called once per mutation with the items as they are now.
    fn cart_changed(&self, items: &[LineItem]);
}

/// Display state that lives beside the cart but is not part of its snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUi {
    /// Whether the cart side panel is open.
    pub panel_open: bool,
    /// The most recently raised toast, visible or not.
    pub toast: Option<Toast>,
}

/// In-memory cart state plus its mutation operations.
pub struct CartStore {
    items: Vec<LineItem>,
    ui: CartUi,
    clock: Arc<dyn Clock>,
    observers: Vec<Box<dyn CartObserver>>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("ui", &self.ui)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// An empty cart on the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// An empty cart whose toasts are timed by `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            items: Vec::new(),
            ui: CartUi::default(),
            clock,
            observers: Vec::new(),
        }
    }

    /// Seed the store with previously restored items.
    ///
    /// Observers are not notified; nothing has changed from their point of view.
    #[must_use]
    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    /// Seed the store with previously saved display state.
    #[must_use]
    pub fn with_ui(mut self, ui: CartUi) -> Self {
        self.ui = ui;
        self
    }

    /// Register an observer for every subsequent mutation.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The line for `id`, if any.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |sum, item| sum.saturating_add(item.qty))
    }

    /// Sum of `price * qty` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Whether the cart side panel is open.
    #[must_use]
    pub const fn is_panel_open(&self) -> bool {
        self.ui.panel_open
    }

    /// The toast message, if one is still within its display window.
    #[must_use]
    pub fn toast(&self) -> Option<&str> {
        let now = self.clock.now();
        self.ui
            .toast
            .as_ref()
            .filter(|toast| toast.is_visible(now))
            .map(|toast| toast.message.as_str())
    }

    /// Display state with any expired toast dropped.
    #[must_use]
    pub fn ui(&self) -> CartUi {
        let now = self.clock.now();
        CartUi {
            panel_open: self.ui.panel_open,
            toast: self.ui.toast.clone().filter(|toast| toast.is_visible(now)),
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Add one unit of a product.
    ///
    /// An id already in the cart has its quantity bumped; its stored name,
    /// price and image are left as first added. A new id is appended with a
    /// quantity of one. Either way the shopper gets a toast and the cart panel
    /// opens.
    pub fn add_item(
        &mut self,
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Price,
        image: Option<String>,
    ) {
        let id = id.into();
        let name = name.into();

        if let Some(existing) = self.items.iter_mut().find(|item| item.id == id) {
            existing.qty = existing.qty.saturating_add(1);
        } else {
            self.items
                .push(LineItem::new(id, name.clone(), price, image));
        }
        self.changed();

        self.notify(format!("✓ {name} added to cart"));
        self.open_panel();
    }

    /// Remove the line for `id`. Absent ids are ignored.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.items.retain(|item| &item.id != id);
        self.changed();
    }

    /// Overwrite the quantity for `id`; zero or less removes the line.
    pub fn set_qty(&mut self, id: &ProductId, qty: i64) {
        match u32::try_from(qty) {
            Ok(qty) if qty > 0 => {
                if let Some(item) = self.items.iter_mut().find(|item| &item.id == id) {
                    item.qty = qty;
                }
                self.changed();
            }
            // Quantities beyond u32 are clamped rather than dropped.
            Err(_) if qty > 0 => self.set_qty(id, i64::from(u32::MAX)),
            _ => self.remove_item(id),
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.changed();
    }

    /// Replace every line at once.
    pub fn replace(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.changed();
    }

    /// Open the cart side panel.
    pub const fn open_panel(&mut self) {
        self.ui.panel_open = true;
    }

    /// Close the cart side panel.
    pub const fn close_panel(&mut self) {
        self.ui.panel_open = false;
    }

    /// Raise a toast, replacing any current one and restarting its timer.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.ui.toast = Some(Toast::raise(message, self.clock.now()));
    }

    fn changed(&self) {
        for observer in &self.observers {
            observer.cart_changed(&self.items);
        }
    }
}
