//! The visitor's cart, backed by their session.
//!
//! Each request opens the cart from the session snapshot, runs cart store
//! operations against it, and calls [`SessionCart::save`] before responding.
//! The store writes snapshots synchronously through its persistence
//! observer; [`SessionSlot`] buffers those writes and `save` flushes them to
//! the async session store.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

use aura_core::snapshot::{self, SnapshotPersister};
use aura_core::{CartStore, CartUi, SlotError, SnapshotSlot};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;
use crate::state::AppState;

#[derive(Debug, Default)]
struct SlotState {
    value: Option<String>,
    dirty: bool,
}

/// Snapshot slot holding the session's `auraCart` value for one request.
#[derive(Debug, Default)]
pub struct SessionSlot {
    state: Mutex<SlotState>,
}

impl SessionSlot {
    /// A slot seeded with the value read from the session.
    #[must_use]
    pub fn seeded(value: Option<String>) -> Self {
        Self {
            state: Mutex::new(SlotState {
                value,
                dirty: false,
            }),
        }
    }

    /// The pending value, if the slot was written since it was seeded.
    ///
    /// `Some(None)` means the snapshot should be deleted.
    fn take_pending(&self) -> Option<Option<String>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.dirty {
            state.dirty = false;
            Some(state.value.clone())
        } else {
            None
        }
    }

    fn set(&self, value: Option<String>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.value = value;
        state.dirty = true;
    }
}

impl SnapshotSlot for SessionSlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state.value.clone())
    }

    fn write(&self, value: &str) -> Result<(), SlotError> {
        self.set(Some(value.to_owned()));
        Ok(())
    }

    fn remove(&self) -> Result<(), SlotError> {
        self.set(None);
        Ok(())
    }
}

/// A cart store wired to the visitor's session.
///
/// Derefs to [`CartStore`], so handlers call cart operations directly.
pub struct SessionCart {
    store: CartStore,
    slot: Arc<SessionSlot>,
    session: Session,
}

impl SessionCart {
    /// Open the cart stored in `session`.
    ///
    /// A session that cannot be read yields an empty cart.
    pub async fn open(session: Session, state: &AppState) -> Self {
        let raw = session
            .get::<String>(session_keys::CART)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Cart session unreadable, starting empty");
                None
            });
        let ui = session
            .get::<CartUi>(session_keys::CART_UI)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        let slot = Arc::new(SessionSlot::seeded(raw));
        let mut store = CartStore::with_clock(state.clock())
            .with_items(snapshot::restore(&*slot))
            .with_ui(ui);
        store.subscribe(SnapshotPersister::new(Arc::clone(&slot)));

        Self {
            store,
            slot,
            session,
        }
    }

    /// The underlying session, for data kept beside the cart.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Flush the snapshot and display state back to the session.
    ///
    /// Failures are logged, not retried.
    pub async fn save(&self) {
        if let Some(pending) = self.slot.take_pending() {
            let result = match pending {
                Some(raw) => self.session.insert(session_keys::CART, raw).await,
                None => self.session.remove::<String>(session_keys::CART).await.map(|_| ()),
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to persist cart to session");
            }
        }

        if let Err(e) = self
            .session
            .insert(session_keys::CART_UI, self.store.ui())
            .await
        {
            tracing::warn!(error = %e, "Failed to persist cart panel state");
        }
    }
}

impl Deref for SessionCart {
    type Target = CartStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl DerefMut for SessionCart {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;
        let app = AppState::from_ref(state);
        Ok(Self::open(session, &app).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_tracks_pending_writes() {
        let slot = SessionSlot::seeded(Some("[]".into()));
        assert_eq!(slot.take_pending(), None);
        assert_eq!(slot.read().unwrap().as_deref(), Some("[]"));

        slot.write("[1]").unwrap();
        assert_eq!(slot.take_pending(), Some(Some("[1]".into())));
        assert_eq!(slot.take_pending(), None);

        slot.remove().unwrap();
        assert_eq!(slot.take_pending(), Some(None));
        assert_eq!(slot.read().unwrap(), None);
    }
}
