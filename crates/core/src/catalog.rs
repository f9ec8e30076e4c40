//! The static product catalog.
//!
//! The catalog is loaded once at startup and never mutated. It mirrors the
//! JSON document the storefront ships with:
//!
//! ```json
//! { "products": [...], "categories": [...], "banners": [...] }
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId};

/// How many products the home page features.
pub const FEATURED_LIMIT: usize = 5;

/// How many products each navigation shortlist shows.
pub const SHORTLIST_LIMIT: usize = 5;

/// Rating from which a product counts as a bestseller.
const BESTSELLER_MIN_RATING: u8 = 4;

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    pub image: String,
    #[serde(default)]
    pub notes: String,
    /// Whole stars, 0 to 5.
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub badge_type: Option<String>,
    pub category: CategoryId,
}

impl Product {
    /// Whether the product carries the given badge type.
    #[must_use]
    pub fn has_badge_type(&self, kind: &str) -> bool {
        self.badge_type.as_deref() == Some(kind)
    }

    /// Whether an original price above the current one is on record.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub image: String,
    pub link: String,
}

/// A home page hero banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub image: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// All products, categories and banners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub banners: Vec<Banner>,
}

impl Catalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match the catalog shape.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Find a product by id.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Find a category by id.
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Products in a category, in catalog order.
    pub fn in_category<'a>(
        &'a self,
        id: &CategoryId,
    ) -> impl Iterator<Item = &'a Product> + use<'a> {
        let id = id.clone();
        self.products.iter().filter(move |p| p.category == id)
    }

    /// The first few products, as featured on the home page.
    #[must_use]
    pub fn featured(&self) -> &[Product] {
        &self.products[..self.products.len().min(FEATURED_LIMIT)]
    }

    /// Bestsellers: flagged as such or rated four stars and up.
    #[must_use]
    pub fn bestsellers(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.has_badge_type("bestseller") || p.rating >= BESTSELLER_MIN_RATING)
            .take(SHORTLIST_LIMIT)
            .collect()
    }

    /// New arrivals: products badged as new or on sale.
    #[must_use]
    pub fn new_arrivals(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.has_badge_type("new") || p.has_badge_type("sale"))
            .take(SHORTLIST_LIMIT)
            .collect()
    }

    /// Products sharing a category with `product`, excluding it.
    #[must_use]
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&Product> {
        self.in_category(&product.category)
            .filter(|p| p.id != product.id)
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use super::*;

    pub fn product(id: &str, category: &str, price: u64, rating: u8) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            price: Price::new(price),
            original_price: None,
            image: format!("/images/{id}.jpg"),
            notes: String::new(),
            rating,
            reviews: 0,
            badge: None,
            badge_type: None,
            category: CategoryId::new(category),
        }
    }

    #[test]
    fn test_parses_document_shape() {
        let raw = r#"{
            "products": [{
                "id": "rose-oud", "name": "Rose Oud", "price": 2599,
                "originalPrice": 3200, "image": "/p/rose.jpg",
                "notes": "sweet rose, oud", "rating": 5, "reviews": 42,
                "badge": "Bestseller", "badgeType": "bestseller", "category": "men"
            }],
            "categories": [{"id": "men", "name": "Men", "image": "/c/men.jpg", "link": "/category/men"}]
        }"#;
        let catalog = Catalog::from_json(raw).unwrap();

        let rose = catalog.product(&ProductId::new("rose-oud")).unwrap();
        assert_eq!(rose.original_price, Some(Price::new(3200)));
        assert!(rose.is_discounted());
        assert!(rose.has_badge_type("bestseller"));
        assert!(catalog.banners.is_empty());
        assert_eq!(catalog.category(&CategoryId::new("men")).unwrap().name, "Men");
    }

    #[test]
    fn test_lookups_miss_cleanly() {
        let catalog = Catalog::default();
        assert!(catalog.product(&ProductId::new("nope")).is_none());
        assert!(catalog.category(&CategoryId::new("nope")).is_none());
        assert!(catalog.featured().is_empty());
    }

    #[test]
    fn test_featured_and_shortlists() {
        let mut products: Vec<Product> = (0..8)
            .map(|i| product(&format!("p{i}"), "men", 100, 3))
            .collect();
        products[6].rating = 5;
        products[7].badge_type = Some("new".into());
        let catalog = Catalog {
            products,
            ..Catalog::default()
        };

        assert_eq!(catalog.featured().len(), FEATURED_LIMIT);
        let best: Vec<&str> = catalog.bestsellers().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(best, vec!["p6"]);
        let fresh: Vec<&str> = catalog.new_arrivals().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(fresh, vec!["p7"]);
    }

    #[test]
    fn test_related_excludes_self() {
        let catalog = Catalog {
            products: vec![
                product("a", "men", 1, 0),
                product("b", "women", 1, 0),
                product("c", "men", 1, 0),
            ],
            ..Catalog::default()
        };
        let related = catalog.related(&catalog.products[0], 4);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id.as_str(), "c");
    }

    #[test]
    fn test_in_category_outlives_id() {
        let catalog = Catalog {
            products: vec![
                product("a", "men", 1, 0),
                product("b", "women", 1, 0),
                product("c", "men", 1, 0),
            ],
            ..Catalog::default()
        };
        let men = {
            let id = CategoryId::new("men");
            catalog.in_category(&id)
        };
        let ids: Vec<&str> = men.map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }
}
