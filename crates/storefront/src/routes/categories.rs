//! Category route handlers.

use aura_core::CategoryId;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::{NotFoundTemplate, current_path};
use crate::cart_session::SessionCart;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;
use crate::views::{Chrome, ProductCard};

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub chrome: Chrome,
    pub id: String,
    pub name: String,
    pub image: String,
    pub products: Vec<ProductCard>,
}

/// Category page. Ids are matched case-insensitively.
#[instrument(skip(state, cart, nonce))]
pub async fn show(
    State(state): State<AppState>,
    cart: SessionCart,
    CspNonce(nonce): CspNonce,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    let chrome = Chrome::new(&state, &cart, nonce, current_path(&uri));
    let catalog = state.catalog();

    let Some(category) = catalog.category(&CategoryId::from_path(&id)) else {
        return NotFoundTemplate::response(chrome, "category").into_response();
    };

    CategoryShowTemplate {
        chrome,
        id: category.id.to_string(),
        name: category.name.clone(),
        image: category.image.clone(),
        products: ProductCard::list(catalog.in_category(&category.id)),
    }
    .into_response()
}
