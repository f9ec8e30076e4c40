//! Cart route handlers.
//!
//! Every mutation is a plain form post that runs cart store operations on the
//! session cart, saves it and redirects back to the page it came from.

use aura_core::{OrderTotals, ProductId};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::Uri,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use super::{current_path, safe_return};
use crate::cart_session::SessionCart;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;
use crate::views::Chrome;

/// Largest quantity accepted by a single add.
pub const MAX_ADD_QUANTITY: u32 = 99;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
    /// Present when the shopper chose "Buy now".
    pub buy_now: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub qty: i64,
    pub return_to: Option<String>,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
    pub return_to: Option<String>,
}

/// Form carrying only a return target.
#[derive(Debug, Deserialize)]
pub struct ReturnForm {
    pub return_to: Option<String>,
}

/// Preformatted order summary.
#[derive(Clone)]
pub struct TotalsView {
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl From<OrderTotals> for TotalsView {
    fn from(totals: OrderTotals) -> Self {
        Self {
            subtotal: totals.subtotal.display(),
            shipping: totals.shipping.display(),
            total: totals.total.display(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: Chrome,
    pub totals: TotalsView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, cart, nonce))]
pub async fn show(
    State(state): State<AppState>,
    cart: SessionCart,
    CspNonce(nonce): CspNonce,
    uri: Uri,
) -> impl IntoResponse {
    let totals = OrderTotals::for_items(cart.items(), state.config().shipping_fee);

    CartShowTemplate {
        chrome: Chrome::new(&state, &cart, nonce, current_path(&uri)),
        totals: totals.into(),
    }
}

/// Cart count badge.
#[instrument(skip(cart))]
pub async fn count(cart: SessionCart) -> impl IntoResponse {
    CartCountTemplate {
        count: cart.count(),
    }
}

/// Add a catalog product to the cart.
///
/// Name, price and image come from the catalog. A quantity of N performs N
/// single-unit adds.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let id = ProductId::new(form.id.trim());
    let product = state
        .catalog()
        .product(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let quantity = form.quantity.unwrap_or(1).clamp(1, MAX_ADD_QUANTITY);
    for _ in 0..quantity {
        cart.add_item(
            product.id.clone(),
            product.name.clone(),
            product.price,
            Some(product.image.clone()),
        );
    }
    cart.save().await;

    tracing::info!(product = %product.id, quantity, "Added to cart");
    add_breadcrumb("cart", "Added to cart", Some(&[("product", product.id.as_str())]));

    if form.buy_now.is_some() {
        return Ok(Redirect::to("/checkout"));
    }
    Ok(Redirect::to(safe_return(form.return_to.as_deref())))
}

/// Overwrite a line's quantity; zero or less removes it.
#[instrument(skip(cart))]
pub async fn update(mut cart: SessionCart, Form(form): Form<UpdateCartForm>) -> Redirect {
    cart.set_qty(&ProductId::new(form.id), form.qty);
    cart.save().await;

    Redirect::to(safe_return(form.return_to.as_deref()))
}

/// Remove a line.
#[instrument(skip(cart))]
pub async fn remove(mut cart: SessionCart, Form(form): Form<RemoveFromCartForm>) -> Redirect {
    cart.remove_item(&ProductId::new(form.id));
    cart.save().await;

    Redirect::to(safe_return(form.return_to.as_deref()))
}

/// Empty the cart.
#[instrument(skip(cart))]
pub async fn clear(mut cart: SessionCart, Form(form): Form<ReturnForm>) -> Redirect {
    cart.clear();
    cart.save().await;

    Redirect::to(safe_return(form.return_to.as_deref()))
}

/// Open the cart side panel.
#[instrument(skip(cart))]
pub async fn open(mut cart: SessionCart, Form(form): Form<ReturnForm>) -> Redirect {
    cart.open_panel();
    cart.save().await;

    Redirect::to(safe_return(form.return_to.as_deref()))
}

/// Close the cart side panel.
#[instrument(skip(cart))]
pub async fn close(mut cart: SessionCart, Form(form): Form<ReturnForm>) -> Redirect {
    cart.close_panel();
    cart.save().await;

    Redirect::to(safe_return(form.return_to.as_deref()))
}
