//! Core trait for product data sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::SourceError;
use crate::state::{Categories, Filters, Product, SortOrder};

/// Query for a page of products. `None` fields are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Query for the products the list view should show.
    pub fn from_filters(filters: &Filters, page: u32, limit: u32) -> Self {
        Self {
            search: non_empty(&filters.search),
            category1: non_empty(&filters.category1),
            category2: non_empty(&filters.category2),
            sort: Some(filters.sort),
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Query for products sharing a product's categories.
    ///
    /// Returns `None` when the product has no primary category, in which
    /// case there is nothing to relate it to.
    pub fn related_to(product: &Product) -> Option<Self> {
        let category1 = product.category1.clone().filter(|c| !c.is_empty())?;
        Some(Self {
            category1: Some(category1),
            category2: product.category2.clone().filter(|c| !c.is_empty()),
            ..Self::default()
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// One page of products plus the total match count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
}

/// Where products come from.
///
/// Implementations must be cheap to share (`Arc<dyn ProductSource>`) and
/// must never panic on bad input; every failure is a [`SourceError`].
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch a single product by id.
    async fn get_product(&self, product_id: &str) -> Result<Product, SourceError>;

    /// Fetch a page of products matching `query`.
    async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, SourceError>;

    /// Fetch the category tree.
    async fn get_categories(&self) -> Result<Categories, SourceError>;
}
