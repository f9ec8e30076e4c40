//! Application state shared across handlers.

use std::sync::Arc;

use aura_core::{Catalog, Clock, SystemClock};

use crate::config::StorefrontConfig;
use crate::services::{DisabledNotifier, MailRelay, NotifyError, OrderNotifier};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, configuration and the order notifier.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    notifier: Arc<dyn OrderNotifier>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create application state with explicit collaborators.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        notifier: Arc<dyn OrderNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                notifier,
                clock,
            }),
        }
    }

    /// Create application state for production: the mail relay when one is
    /// configured and the wall clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the mail relay configuration is invalid.
    pub fn from_config(config: StorefrontConfig, catalog: Catalog) -> Result<Self, NotifyError> {
        let notifier: Arc<dyn OrderNotifier> = match &config.mail {
            Some(mail) => Arc::new(MailRelay::new(mail)?),
            None => {
                tracing::warn!("SMTP_USER not set, order mail is disabled");
                Arc::new(DisabledNotifier)
            }
        };

        Ok(Self::new(config, catalog, notifier, Arc::new(SystemClock)))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the order notifier.
    #[must_use]
    pub fn notifier(&self) -> &dyn OrderNotifier {
        self.inner.notifier.as_ref()
    }

    /// Get the clock used for toast deadlines.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.inner.clock)
    }
}
