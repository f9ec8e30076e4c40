//! Product route handlers.

use aura_core::{CatalogQuery, CategoryFilter, ProductId, SortMode};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::{NotFoundTemplate, current_path};
use crate::cart_session::SessionCart;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;
use crate::views::{Chrome, ProductCard};

/// Related products shown under a product.
const RELATED_LIMIT: usize = 4;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// A `<select>` option.
#[derive(Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: Chrome,
    pub search: String,
    pub categories: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
    pub products: Vec<ProductCard>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: Chrome,
    pub product: ProductCard,
    pub category_name: String,
    pub related: Vec<ProductCard>,
}

/// Product listing with search, category filter and sort.
#[instrument(skip(state, cart, nonce))]
pub async fn index(
    State(state): State<AppState>,
    cart: SessionCart,
    CspNonce(nonce): CspNonce,
    uri: Uri,
    Query(params): Query<ListingQuery>,
) -> impl IntoResponse {
    let query = CatalogQuery::from_params(
        params.q.as_deref(),
        params.category.as_deref(),
        params.sort.as_deref(),
    );
    let catalog = state.catalog();
    let products = ProductCard::list(query.apply(&catalog.products));

    let categories = std::iter::once(SelectOption {
        value: "all".to_string(),
        label: "All Categories".to_string(),
        selected: query.category == CategoryFilter::All,
    })
    .chain(catalog.categories.iter().map(|category| SelectOption {
        value: category.id.to_string(),
        label: category.name.clone(),
        selected: query.category.as_str() == category.id.as_str(),
    }))
    .collect();

    let sorts = SortMode::ALL
        .iter()
        .map(|mode| SelectOption {
            value: mode.as_str().to_string(),
            label: mode.label().to_string(),
            selected: *mode == query.sort,
        })
        .collect();

    ProductsIndexTemplate {
        chrome: Chrome::new(&state, &cart, nonce, current_path(&uri)),
        search: query.search,
        categories,
        sorts,
        products,
    }
}

/// Product detail page.
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

    let Some(product) = catalog.product(&ProductId::new(id)) else {
        return NotFoundTemplate::response(chrome, "product").into_response();
    };

    let category_name = catalog
        .category(&product.category)
        .map_or_else(|| product.category.to_string(), |c| c.name.clone());

    ProductShowTemplate {
        chrome,
        product: ProductCard::from(product),
        category_name,
        related: ProductCard::list(catalog.related(product, RELATED_LIMIT)),
    }
    .into_response()
}
