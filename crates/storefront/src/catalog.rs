//! Loading the product catalog from disk.
//!
//! The catalog is read once at startup. Category ids are lowercased on load
//! so path lookups (`/category/Men`) resolve the same way as links.

use std::path::Path;

use aura_core::{Catalog, CategoryId};
use thiserror::Error;

/// Errors loading the catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("product {product} references unknown category {category}")]
    UnknownCategory { product: String, category: String },
}

/// Read and validate the catalog at `path`.
///
/// # Errors
///
/// Returns `CatalogError` if the file is missing, malformed, or a product
/// references a category the document does not define.
pub fn load(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let catalog = parse(&raw).map_err(|e| match e {
        CatalogError::Parse { source, .. } => CatalogError::Parse {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })?;

    tracing::info!(
        path = %path.display(),
        products = catalog.products.len(),
        categories = catalog.categories.len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Parse and normalize a catalog document.
///
/// # Errors
///
/// Returns `CatalogError` if the document is malformed or a product
/// references an undefined category.
pub fn parse(raw: &str) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::from_json(raw).map_err(|source| CatalogError::Parse {
        path: "<inline>".to_string(),
        source,
    })?;

    for category in &mut catalog.categories {
        category.id = CategoryId::from_path(category.id.as_str());
    }
    for product in &mut catalog.products {
        product.category = CategoryId::from_path(product.category.as_str());
        product.rating = product.rating.min(5);
    }

    if let Some(orphan) = catalog
        .products
        .iter()
        .find(|p| catalog.category(&p.category).is_none())
    {
        return Err(CatalogError::UnknownCategory {
            product: orphan.id.to_string(),
            category: orphan.category.to_string(),
        });
    }

    Ok(catalog)
}
