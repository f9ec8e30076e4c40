//! Checkout route handlers.
//!
//! The form flow guards against double submission with a one-time token:
//! `GET /checkout` stores a fresh token in the session, and `POST /checkout`
//! consumes it before calling the mail relay. A post without the current
//! token is treated as a duplicate and sent back to the form unsent.

use aura_core::{CheckoutData, ContactInfo, OrderTotals};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use super::cart::TotalsView;
use crate::cart_session::SessionCart;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::session_keys;
use crate::services::whatsapp;
use crate::state::AppState;
use crate::views::Chrome;

/// Shown when an order is submitted with nothing in the cart.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty.";

/// Shown when the mail relay rejects an order.
pub const SUBMIT_FAILED_MESSAGE: &str = "Sorry, could not process your order at this time.";

/// JSON error body for a failed relay call.
pub const API_FAILED_MESSAGE: &str = "Failed to process order";

/// Checkout form data. Field names match the JSON contact payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutForm {
    pub token: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub apartment: Option<String>,
    pub city: String,
    pub postal_code: String,
}

impl CheckoutForm {
    /// Split into the presented token and the contact details.
    fn into_parts(self) -> (String, ContactInfo) {
        let contact = ContactInfo {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            apartment: self.apartment.filter(|apt| !apt.trim().is_empty()),
            city: self.city,
            postal_code: self.postal_code,
        };
        (self.token, contact)
    }
}

/// Confirmation page query parameters.
#[derive(Debug, Deserialize)]
pub struct ConfirmationQuery {
    pub whatsapp_url: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub chrome: Chrome,
    pub totals: TotalsView,
    pub form: ContactInfo,
    pub apartment: String,
    pub token: String,
    pub error: Option<String>,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub chrome: Chrome,
    pub whatsapp_url: Option<String>,
}

/// Store a fresh one-time checkout token in the session.
async fn issue_token(session: &Session) -> Result<String> {
    let token = Uuid::new_v4().to_string();
    session
        .insert(session_keys::CHECKOUT_TOKEN, token.clone())
        .await?;
    Ok(token)
}

/// Take the session's checkout token and check it against `presented`.
///
/// The token is gone afterwards whether or not it matched, and the removal
/// is written through at once so a concurrent post cannot reuse it.
async fn consume_token(session: &Session, presented: &str) -> Result<bool> {
    let issued = session
        .remove::<String>(session_keys::CHECKOUT_TOKEN)
        .await?;
    session.save().await?;
    Ok(issued.as_deref() == Some(presented))
}

fn checkout_page(
    state: &AppState,
    cart: &SessionCart,
    nonce: String,
    token: String,
    form: ContactInfo,
    error: Option<String>,
) -> CheckoutShowTemplate {
    let totals = OrderTotals::for_items(cart.items(), state.config().shipping_fee);
    CheckoutShowTemplate {
        chrome: Chrome::new(state, cart, nonce, "/checkout"),
        totals: totals.into(),
        apartment: form.apartment().unwrap_or_default().to_string(),
        form,
        token,
        error,
    }
}

/// Display the checkout form and order summary.
#[instrument(skip(state, cart, nonce))]
pub async fn show(
    State(state): State<AppState>,
    cart: SessionCart,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let token = issue_token(cart.session()).await?;
    Ok(checkout_page(
        &state,
        &cart,
        nonce,
        token,
        ContactInfo::default(),
        None,
    ))
}

/// Submit the checkout form.
///
/// On success the cart is cleared and the shopper is redirected to the
/// confirmation page with the relay link. On relay failure the form is shown
/// again with the cart untouched and a new token.
#[instrument(skip(state, cart, nonce, form))]
pub async fn submit(
    State(state): State<AppState>,
    mut cart: SessionCart,
    CspNonce(nonce): CspNonce,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let (token, contact) = form.into_parts();

    if cart.is_empty() {
        let page = checkout_page(
            &state,
            &cart,
            nonce,
            token,
            contact,
            Some(EMPTY_CART_MESSAGE.to_string()),
        );
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    }

    if let Err(e) = contact.validate() {
        let page = checkout_page(&state, &cart, nonce, token, contact, Some(e.to_string()));
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    }

    if !consume_token(cart.session(), &token).await? {
        tracing::info!("Ignoring duplicate or stale checkout submission");
        return Ok(Redirect::to("/checkout").into_response());
    }

    let totals = OrderTotals::for_items(cart.items(), state.config().shipping_fee);
    let order = CheckoutData::new(contact, cart.items().to_vec(), totals);
    add_breadcrumb("checkout", "Submitting order", None);

    match state.notifier().notify_order(&order).await {
        Ok(()) => {
            let link = whatsapp::order_link(&state.config().whatsapp_number, &order);
            cart.clear();
            cart.save().await;

            tracing::info!(
                lines = order.cart.len(),
                total = %order.total,
                "Order submitted"
            );
            let target = format!(
                "/order-confirmation?whatsapp_url={}",
                urlencoding::encode(&link)
            );
            Ok(Redirect::to(&target).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Order notification failed");
            // The session layer does not persist changes on 5xx responses.
            let token = issue_token(cart.session()).await?;
            cart.session().save().await?;
            let page = checkout_page(
                &state,
                &cart,
                nonce,
                token,
                order.contact_info,
                Some(SUBMIT_FAILED_MESSAGE.to_string()),
            );
            Ok((StatusCode::BAD_GATEWAY, page).into_response())
        }
    }
}

/// JSON order submission.
///
/// Returns `{"success": true}`, or status 500 with
/// `{"error": "Failed to process order"}` when the relay fails. Orders with no
/// lines or bad contact details are rejected with status 400 before the relay
/// is called.
#[instrument(skip(state, order), fields(lines = order.cart.len()))]
pub async fn api_submit(State(state): State<AppState>, Json(order): Json<CheckoutData>) -> Response {
    if order.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": EMPTY_CART_MESSAGE })),
        )
            .into_response();
    }
    if let Err(e) = order.contact_info.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    match state.notifier().notify_order(&order).await {
        Ok(()) => {
            tracing::info!(total = %order.total, "Order submitted via API");
            Json(json!({ "success": true })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Order notification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": API_FAILED_MESSAGE })),
            )
                .into_response()
        }
    }
}

/// Order confirmation page.
///
/// Only links to the message app are rendered; anything else in the query is
/// dropped.
#[instrument(skip(state, cart, nonce))]
pub async fn confirmation(
    State(state): State<AppState>,
    cart: SessionCart,
    CspNonce(nonce): CspNonce,
    Query(query): Query<ConfirmationQuery>,
) -> impl IntoResponse {
    let whatsapp_url = query
        .whatsapp_url
        .filter(|url| whatsapp::is_relay_link(url));

    ConfirmationTemplate {
        chrome: Chrome::new(&state, &cart, nonce, "/order-confirmation"),
        whatsapp_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_drops_blank_apartment() {
        let form = CheckoutForm {
            token: "t".into(),
            apartment: Some("  ".into()),
            ..CheckoutForm::default()
        };
        let (token, contact) = form.into_parts();
        assert_eq!(token, "t");
        assert_eq!(contact.apartment, None);
    }

    #[test]
    fn test_form_keeps_apartment() {
        let form = CheckoutForm {
            apartment: Some("Flat 4".into()),
            ..CheckoutForm::default()
        };
        let (_, contact) = form.into_parts();
        assert_eq!(contact.apartment(), Some("Flat 4"));
    }
}
