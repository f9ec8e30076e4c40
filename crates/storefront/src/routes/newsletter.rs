//! Newsletter subscription route handler.
//!
//! Nothing is stored; the shopper gets a toast and is sent back where they
//! came from.

use aura_core::Email;
use axum::{Form, response::Redirect};
use serde::Deserialize;
use tracing::instrument;

use super::safe_return;
use crate::cart_session::SessionCart;

/// Toast shown after subscribing.
pub const SUBSCRIBED_TOAST: &str = "✓ Subscribed! Welcome to Aura Sentiments 🌙";

/// Toast shown when the address does not parse.
pub const INVALID_EMAIL_TOAST: &str = "Please enter a valid email address.";

/// Newsletter subscription form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub email: String,
    pub return_to: Option<String>,
}

/// Subscribe to the newsletter.
#[instrument(skip(cart), fields(email = %form.email))]
pub async fn subscribe(mut cart: SessionCart, Form(form): Form<SubscribeForm>) -> Redirect {
    match Email::parse(&form.email) {
        Ok(email) => {
            tracing::info!(domain = %email.domain(), "Newsletter subscription");
            cart.notify(SUBSCRIBED_TOAST);
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected newsletter address");
            cart.notify(INVALID_EMAIL_TOAST);
        }
    }
    cart.save().await;

    Redirect::to(safe_return(form.return_to.as_deref()))
}
