//! Search, filter and sort over the catalog.
//!
//! Queries are pure and re-run on every request; the catalog is small enough
//! that nothing is cached.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::CategoryId;

/// The category filter. `"all"` disables filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Id(CategoryId),
}

impl CategoryFilter {
    /// Sentinel accepted for "no filtering".
    pub const ALL: &'static str = "all";

    /// Parse a filter value. Blank input and `"all"` mean no filtering.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(Self::ALL) {
            Self::All
        } else {
            Self::Id(CategoryId::from_path(raw))
        }
    }

    /// Form value for this filter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Id(id) => id.as_str(),
        }
    }

    fn admits(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => &product.category == id,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Catalog order.
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Rating,
}

impl SortMode {
    /// Every mode, in the order the sort menu lists them.
    pub const ALL: [Self; 4] = [Self::Featured, Self::PriceLow, Self::PriceHigh, Self::Rating];

    /// Parse a sort key, falling back to [`SortMode::Featured`] for anything unknown.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "rating" => Self::Rating,
            _ => Self::Featured,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
        }
    }

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Rating => "Top Rated",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring; blank matches everything.
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortMode,
}

impl CatalogQuery {
    /// Build a query from raw request parameters.
    #[must_use]
    pub fn from_params(search: Option<&str>, category: Option<&str>, sort: Option<&str>) -> Self {
        Self {
            search: search.map(str::trim).unwrap_or_default().to_owned(),
            category: category.map(CategoryFilter::parse).unwrap_or_default(),
            sort: sort.map(SortMode::parse).unwrap_or_default(),
        }
    }

    /// Whether `product` passes the search and category filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category.admits(product) && matches_search(product, &self.search)
    }

    /// Filter and order `products`. Ties keep their input order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut hits: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();

        // `sort_by` is stable, which the tie-breaking relies on.
        match self.sort {
            SortMode::Featured => {}
            SortMode::PriceLow => hits.sort_by(|a, b| a.price.cmp(&b.price)),
            SortMode::PriceHigh => hits.sort_by(|a, b| b.price.cmp(&a.price)),
            SortMode::Rating => hits.sort_by(|a, b| b.rating.cmp(&a.rating)),
        }

        hits
    }
}

fn matches_search(product: &Product, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    [
        product.name.as_str(),
        product.category.as_str(),
        product.notes.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}
