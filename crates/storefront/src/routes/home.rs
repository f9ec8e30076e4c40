//! Home page route handler.

use aura_core::{Banner, Catalog};
use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::cart_session::SessionCart;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;
use crate::views::{NavLink, ProductCard};

/// A category with its first few products.
#[derive(Clone)]
pub struct CategoryRow {
    pub link: NavLink,
    pub image: String,
    pub products: Vec<ProductCard>,
}

/// A headline figure in the stats strip.
#[derive(Clone)]
pub struct Stat {
    pub value: u64,
    pub suffix: &'static str,
    pub label: &'static str,
}

/// Headline figures derived from the catalog.
#[must_use]
pub fn catalog_stats(catalog: &Catalog) -> Vec<Stat> {
    let reviews: u64 = catalog.products.iter().map(|p| u64::from(p.reviews)).sum();
    let five_star = catalog.products.iter().filter(|p| p.rating == 5).count();

    vec![
        Stat {
            value: catalog.products.len() as u64,
            suffix: "",
            label: "Signature Scents",
        },
        Stat {
            value: catalog.categories.len() as u64,
            suffix: "",
            label: "Collections",
        },
        Stat {
            value: reviews,
            suffix: "+",
            label: "Happy Reviews",
        },
        Stat {
            value: five_star as u64,
            suffix: "",
            label: "Five-Star Favourites",
        },
    ]
}

/// A row per category, each listing every product in it.
#[must_use]
pub fn category_rows(catalog: &Catalog) -> Vec<CategoryRow> {
    catalog
        .categories
        .iter()
        .map(|category| CategoryRow {
            link: NavLink::from(category),
            image: category.image.clone(),
            products: ProductCard::list(catalog.in_category(&category.id)),
        })
        .collect()
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: crate::views::Chrome,
    pub banners: Vec<Banner>,
    pub featured: Vec<ProductCard>,
    pub rows: Vec<CategoryRow>,
    pub stats: Vec<Stat>,
}

/// Display the home page.
#[instrument(skip(state, cart, nonce))]
pub async fn home(
    State(state): State<AppState>,
    cart: SessionCart,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let catalog = state.catalog();

    HomeTemplate {
        chrome: crate::views::Chrome::new(&state, &cart, nonce, "/"),
        banners: catalog.banners.clone(),
        featured: ProductCard::list(catalog.featured()),
        rows: category_rows(catalog),
        stats: catalog_stats(catalog),
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use aura_core::{Category, CategoryId, Price, Product, ProductId};

    use super::*;

    fn catalog() -> Catalog {
        let product = |id: &str, rating: u8, reviews: u32| Product {
            id: ProductId::new(id),
            name: id.to_string(),
            price: Price::new(1000),
            original_price: None,
            image: String::new(),
            notes: String::new(),
            rating,
            reviews,
            badge: None,
            badge_type: None,
            category: CategoryId::new("men"),
        };
        Catalog {
            products: vec![product("a", 5, 1200), product("b", 4, 30), product("c", 5, 0)],
            categories: vec![Category {
                id: CategoryId::new("men"),
                name: "Men".into(),
                image: String::new(),
                link: "/category/men".into(),
            }],
            banners: Vec::new(),
        }
    }

    #[test]
    fn test_catalog_stats() {
        let stats = catalog_stats(&catalog());
        let values: Vec<u64> = stats.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3, 1, 1230, 2]);
    }

    #[test]
    fn test_category_rows_list_every_product() {
        let mut catalog = catalog();
        for i in 0..6 {
            let mut extra = catalog.products[0].clone();
            extra.id = ProductId::new(format!("extra-{i}"));
            catalog.products.push(extra);
        }

        let rows = category_rows(&catalog);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].link.href, "/category/men");
        assert_eq!(rows[0].products.len(), 9);
    }
}
