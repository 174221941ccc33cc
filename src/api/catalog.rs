//! In-memory product catalog.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use super::error::SourceError;
use super::source::{ProductPage, ProductQuery, ProductSource};
use crate::state::{Categories, Product, SortOrder, DEFAULT_PAGE_LIMIT};

/// Errors that can occur when loading a catalog fixture.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate product id '{product_id}' in catalog")]
    DuplicateProduct { product_id: String },
}

/// A fixed product list answering queries the way the remote API does:
/// case-insensitive search over title and brand, exact category match,
/// sorting, then page slicing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let duplicate = {
            let mut seen = HashSet::with_capacity(products.len());
            products
                .iter()
                .find(|p| !seen.insert(p.product_id.as_str()))
                .map(|p| p.product_id.clone())
        };
        if let Some(product_id) = duplicate {
            return Err(CatalogError::DuplicateProduct { product_id });
        }
        Ok(Self { products })
    }

    /// Load a JSON array of products.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let products: Vec<Product> =
            serde_json::from_str(&content).map_err(|e| CatalogError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        Self::new(products)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn matches(product: &Product, query: &ProductQuery) -> bool {
        if let Some(search) = query.search.as_deref() {
            let needle = search.to_lowercase();
            let in_title = product.title.to_lowercase().contains(&needle);
            let in_brand = product
                .brand
                .as_deref()
                .is_some_and(|b| b.to_lowercase().contains(&needle));
            if !in_title && !in_brand {
                return false;
            }
        }
        if let Some(category1) = query.category1.as_deref() {
            if product.category1.as_deref() != Some(category1) {
                return false;
            }
        }
        if let Some(category2) = query.category2.as_deref() {
            if product.category2.as_deref() != Some(category2) {
                return false;
            }
        }
        true
    }
}

fn sort_products(products: &mut [Product], sort: SortOrder) {
    match sort {
        SortOrder::PriceAsc => products.sort_by_key(|p| p.price),
        SortOrder::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::NameAsc => products.sort_by(|a, b| a.title.cmp(&b.title)),
        SortOrder::NameDesc => products.sort_by(|a, b| b.title.cmp(&a.title)),
    }
}

#[async_trait]
impl ProductSource for InMemoryCatalog {
    async fn get_product(&self, product_id: &str) -> Result<Product, SourceError> {
        self.products
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                product_id: product_id.to_string(),
            })
    }

    async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, SourceError> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page == 0 || limit == 0 {
            return Err(SourceError::InvalidQuery {
                message: format!("page {} / limit {} must both be positive", page, limit),
            });
        }

        let mut matched: Vec<Product> = self
            .products
            .iter()
            .filter(|p| Self::matches(p, query))
            .cloned()
            .collect();
        sort_products(&mut matched, query.sort.unwrap_or_default());

        let total = matched.len() as u64;
        let start = (page as usize - 1).saturating_mul(limit as usize);
        let products = matched
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Ok(ProductPage { products, total })
    }

    async fn get_categories(&self) -> Result<Categories, SourceError> {
        let mut categories = Categories::new();
        for product in &self.products {
            let Some(category1) = product.category1.as_ref().filter(|c| !c.is_empty()) else {
                continue;
            };
            let children = categories.entry(category1.clone()).or_default();
            if let Some(category2) = product.category2.as_ref().filter(|c| !c.is_empty()) {
                children.insert(category2.clone());
            }
        }
        Ok(categories)
    }
}
