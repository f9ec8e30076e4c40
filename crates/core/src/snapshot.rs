//! Cart snapshot persistence.
//!
//! The cart is mirrored, whole, into a single durable key-value slot. A
//! [`SnapshotSlot`] is that slot; the storefront backs it with the visitor's
//! session and tests back it with [`MemorySlot`].
//!
//! - [`restore`] reads the slot once when a cart is opened. A missing,
//!   unreadable or malformed value yields an empty cart; the failure is
//!   logged and never reaches the caller.
//! - [`SnapshotPersister`] is a [`CartObserver`] that rewrites the slot with
//!   the full item list after every mutation. An empty cart deletes the slot.
//!   Write failures are logged, not retried.
//!
//! The stored value is a JSON array of line items. It carries no schema
//! version; a value that no longer decodes is simply discarded.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::cart::{CartObserver, LineItem};

/// Errors raised by a [`SnapshotSlot`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// The backing storage could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors decoding a stored snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The value is not a JSON array of line items.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A line has a zero quantity.
    #[error("line {0} has a zero quantity")]
    ZeroQuantity(String),

    /// Two lines share a product id.
    #[error("product {0} appears more than once")]
    DuplicateId(String),
}

/// A single durable string slot holding the cart snapshot.
pub trait SnapshotSlot: Send + Sync {
    /// The stored value, if any.
    ///
    /// # Errors
    ///
    /// Returns `SlotError` if the storage cannot be read.
    fn read(&self) -> Result<Option<String>, SlotError>;

    /// Overwrite the stored value.
    ///
    /// # Errors
    ///
    /// Returns `SlotError` if the storage cannot be written.
    fn write(&self, value: &str) -> Result<(), SlotError>;

    /// Delete the stored value.
    ///
    /// # Errors
    ///
    /// Returns `SlotError` if the storage cannot be written.
    fn remove(&self) -> Result<(), SlotError>;
}

impl<S: SnapshotSlot + ?Sized> SnapshotSlot for Arc<S> {
    fn read(&self) -> Result<Option<String>, SlotError> {
        (**self).read()
    }

    fn write(&self, value: &str) -> Result<(), SlotError> {
        (**self).write(value)
    }

    fn remove(&self) -> Result<(), SlotError> {
        (**self).remove()
    }
}

/// Serialize items into the stored form.
///
/// # Errors
///
/// Returns an error only if serialization itself fails.
pub fn encode(items: &[LineItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Parse the stored form, rejecting values that break cart invariants.
///
/// # Errors
///
/// Returns `SnapshotError` if the value is not a JSON array of line items,
/// a line has a zero quantity, or a product id repeats.
pub fn decode(raw: &str) -> Result<Vec<LineItem>, SnapshotError> {
    let items: Vec<LineItem> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if item.qty == 0 {
            return Err(SnapshotError::ZeroQuantity(item.id.to_string()));
        }
        if !seen.insert(&item.id) {
            return Err(SnapshotError::DuplicateId(item.id.to_string()));
        }
    }

    Ok(items)
}

/// Load the cart from `slot`, falling back to an empty cart on any failure.
pub fn restore(slot: &dyn SnapshotSlot) -> Vec<LineItem> {
    let raw = match slot.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Cart storage unreadable, starting empty");
            return Vec::new();
        }
    };

    decode(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Discarding stored cart");
        Vec::new()
    })
}

/// Observer that mirrors every cart change into a slot.
pub struct SnapshotPersister<S> {
    slot: S,
}

impl<S: SnapshotSlot> SnapshotPersister<S> {
    /// Persist into `slot`.
    pub const fn new(slot: S) -> Self {
        Self { slot }
    }
}

impl<S: SnapshotSlot> CartObserver for SnapshotPersister<S> {
    fn cart_changed(&self, items: &[LineItem]) {
        let result = if items.is_empty() {
            self.slot.remove()
        } else {
            match encode(items) {
                Ok(raw) => self.slot.write(&raw),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode cart snapshot");
                    return;
                }
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, items = items.len(), "Failed to persist cart");
        }
    }
}

/// In-process slot, mainly for tests and previews.
#[derive(Debug, Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot already holding `raw`.
    #[must_use]
    pub fn holding(raw: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(raw.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, SlotError> {
        self.value
            .lock()
            .map_err(|_| SlotError::Unavailable("slot lock poisoned".to_string()))
    }
}

impl SnapshotSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        Ok(self.lock()?.clone())
    }

    fn write(&self, value: &str) -> Result<(), SlotError> {
        *self.lock()? = Some(value.to_owned());
        Ok(())
    }

    fn remove(&self) -> Result<(), SlotError> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::CartStore;
    use crate::types::{Price, ProductId};

    struct BrokenSlot;

    impl SnapshotSlot for BrokenSlot {
        fn read(&self) -> Result<Option<String>, SlotError> {
            Err(SlotError::Unavailable("disabled".into()))
        }
        fn write(&self, _value: &str) -> Result<(), SlotError> {
            Err(SlotError::Unavailable("disabled".into()))
        }
        fn remove(&self) -> Result<(), SlotError> {
            Err(SlotError::Unavailable("disabled".into()))
        }
    }

    fn open(slot: &Arc<MemorySlot>) -> CartStore {
        let mut cart = CartStore::new().with_items(restore(&**slot));
        cart.subscribe(SnapshotPersister::new(Arc::clone(slot)));
        cart
    }

    #[test]
    fn test_round_trip_preserves_sequence() {
        let slot = Arc::new(MemorySlot::new());
        let mut cart = open(&slot);
        cart.add_item("c", "Cedar", Price::new(300), Some("/c.jpg".into()));
        cart.add_item("a", "Amber", Price::new(100), None);
        cart.add_item("c", "Cedar", Price::new(300), Some("/c.jpg".into()));
        cart.add_item("b", "Bergamot", Price::new(250), None);

        let reopened = open(&slot);
        assert_eq!(reopened.items(), cart.items());
        let ids: Vec<&str> = reopened.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(reopened.items()[0].qty, 2);
    }

    #[test]
    fn test_stored_shape() {
        let slot = Arc::new(MemorySlot::new());
        let mut cart = open(&slot);
        cart.add_item("p1", "Rose Oud", Price::new(2599), None);

        let raw = slot.read().unwrap().unwrap();
        assert_eq!(
            raw,
            r#"[{"id":"p1","name":"Rose Oud","price":2599,"qty":1}]"#
        );
    }

    #[test]
    fn test_clear_deletes_slot() {
        let slot = Arc::new(MemorySlot::new());
        let mut cart = open(&slot);
        cart.add_item("a", "Amber", Price::new(100), None);
        assert!(slot.read().unwrap().is_some());

        cart.clear();
        assert_eq!(slot.read().unwrap(), None);
    }

    #[test]
    fn test_malformed_json_yields_empty() {
        let slot = MemorySlot::holding("{not json");
        assert!(restore(&slot).is_empty());
    }

    #[test]
    fn test_wrong_shape_yields_empty() {
        assert!(restore(&MemorySlot::holding(r#"{"id":"a"}"#)).is_empty());
        assert!(restore(&MemorySlot::holding(r#"[{"id":"a","qty":1}]"#)).is_empty());
    }

    #[test]
    fn test_invariant_violations_yield_empty() {
        let zero = r#"[{"id":"a","name":"A","price":1,"qty":0}]"#;
        assert!(matches!(decode(zero), Err(SnapshotError::ZeroQuantity(_))));
        assert!(restore(&MemorySlot::holding(zero)).is_empty());

        let dup = r#"[{"id":"a","name":"A","price":1,"qty":1},{"id":"a","name":"A","price":1,"qty":2}]"#;
        assert!(matches!(decode(dup), Err(SnapshotError::DuplicateId(_))));
    }

    #[test]
    fn test_unavailable_storage_is_swallowed() {
        assert!(restore(&BrokenSlot).is_empty());

        let mut cart = CartStore::new();
        cart.subscribe(SnapshotPersister::new(BrokenSlot));
        cart.add_item("a", "Amber", Price::new(100), None);
        assert_eq!(cart.get(&ProductId::new("a")).unwrap().qty, 1);
    }

    #[test]
    fn test_image_is_optional_on_decode() {
        let items = decode(r#"[{"id":"a","name":"A","price":10,"image":"/a.png","qty":3}]"#)
            .unwrap();
        assert_eq!(items[0].image.as_deref(), Some("/a.png"));
        assert_eq!(items[0].line_total(), Price::new(30));
    }
}
