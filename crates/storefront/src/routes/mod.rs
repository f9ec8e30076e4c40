//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (?q=&category=&sort=)
//! GET  /product/{id}           - Product detail
//! GET  /category/{id}          - Category page
//!
//! # Cart
//! GET  /cart                   - Cart page
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Set a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! POST /cart/open              - Open the cart panel
//! POST /cart/close             - Close the cart panel
//!
//! # Checkout
//! GET  /checkout               - Checkout form and order summary
//! POST /checkout               - Submit order (form, rate limited)
//! POST /api/checkout           - Submit order (JSON, rate limited)
//! GET  /order-confirmation     - Confirmation with relay link
//!
//! # Newsletter
//! POST /newsletter             - Subscribe
//! ```

pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod newsletter;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::instrument;

use crate::cart_session::SessionCart;
use crate::filters;
use crate::middleware::{CspNonce, checkout_rate_limiter};
use crate::state::AppState;
use crate::views::Chrome;

/// Not-found page rendered inside the normal layout.
#[derive(Template, WebTemplate)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate {
    pub chrome: Chrome,
    pub what: String,
}

impl NotFoundTemplate {
    /// Not-found page paired with its status code.
    #[must_use]
    pub fn response(chrome: Chrome, what: impl Into<String>) -> impl IntoResponse {
        (
            StatusCode::NOT_FOUND,
            Self {
                chrome,
                what: what.into(),
            },
        )
    }
}

/// Path and query of `uri`, for use as a return target.
#[must_use]
pub fn current_path(uri: &Uri) -> &str {
    uri.path_and_query().map_or("/", |pq| pq.as_str())
}

/// Whether `target` is a local absolute path (`/x`, not `//host` or `/\host`).
///
/// Browsers drop tabs and newlines while parsing a `Location`, so any control
/// character or backslash disqualifies the target outright.
#[must_use]
pub fn is_local_path(target: &str) -> bool {
    if target.chars().any(|c| c.is_control() || c == '\\') {
        return false;
    }
    target.starts_with('/') && !target.starts_with("//")
}

/// The redirect target for a form's `return_to`, falling back to `/`.
#[must_use]
pub fn safe_return(target: Option<&str>) -> &str {
    target.filter(|t| is_local_path(t)).unwrap_or("/")
}

/// Liveness health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for unknown paths.
#[instrument(skip(state, cart, nonce))]
pub async fn not_found(
    State(state): State<AppState>,
    cart: SessionCart,
    CspNonce(nonce): CspNonce,
    uri: Uri,
) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "No route");
    let chrome = Chrome::new(&state, &cart, nonce, "/");
    NotFoundTemplate::response(chrome, "page")
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/open", post(cart::open))
        .route("/close", post(cart::close))
}

/// Create the checkout routes router.
///
/// Only the order submissions are rate limited; they share one per-client
/// budget.
pub fn checkout_routes() -> Router<AppState> {
    let limiter = checkout_rate_limiter();

    Router::new()
        .route(
            "/checkout",
            get(checkout::show).merge(post(checkout::submit).layer(limiter.clone())),
        )
        .route("/api/checkout", post(checkout::api_submit).layer(limiter))
        .route("/order-confirmation", get(checkout::confirmation))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        // Catalog
        .route("/products", get(products::index))
        .route("/product/{id}", get(products::show))
        .route("/category/{id}", get(categories::show))
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .merge(checkout_routes())
        // Newsletter
        .route("/newsletter", post(newsletter::subscribe))
        .fallback(not_found)
}
