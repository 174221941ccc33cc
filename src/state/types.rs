//! The application state tree and the records it is made of.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mvi::ViewState;

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Category tree: every `category1` with the `category2` values under it.
pub type Categories = BTreeMap<String, BTreeSet<String>>;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub title: String,
    /// Price in the smallest currency unit.
    pub price: u64,
    #[serde(default)]
    pub image: String,
    /// Units in stock. `None` when the source does not track stock.
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category1: Option<String>,
    #[serde(default)]
    pub category2: Option<String>,
}

/// Sort order for the product list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::PriceAsc,
        SortOrder::PriceDesc,
        SortOrder::NameAsc,
        SortOrder::NameDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a sort key is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort order '{0}'")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| UnknownSortOrder(s.to_string()))
    }
}

/// Pagination bookkeeping.
///
/// Only `total`, `page` and `limit` are inputs; the remaining fields are
/// always recomputed through [`Pagination::derive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Build a pagination record with every derived field filled in.
    pub fn derive(total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            let pages = total.div_ceil(u64::from(limit));
            u32::try_from(pages).unwrap_or(u32::MAX)
        };
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Same total, different page/limit.
    pub fn with(&self, page: u32, limit: u32) -> Self {
        Self::derive(self.total, page, limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::derive(0, 1, DEFAULT_PAGE_LIMIT)
    }
}

/// What the user asked to see. Empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub search: String,
    pub category1: String,
    pub category2: String,
    pub sort: SortOrder,
}

/// Partial filter update. Only `Some` fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

impl FiltersPatch {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.category1.is_none()
            && self.category2.is_none()
            && self.sort.is_none()
    }

    pub(crate) fn apply(self, mut filters: Filters) -> Filters {
        if let Some(search) = self.search {
            filters.search = search;
        }
        if let Some(category1) = self.category1 {
            filters.category1 = category1;
        }
        if let Some(category2) = self.category2 {
            filters.category2 = category2;
        }
        if let Some(sort) = self.sort {
            filters.sort = sort;
        }
        filters
    }
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub is_modal_open: bool,
}

impl Cart {
    pub fn item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Product detail sub-tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Option<Product>,
    pub loading: bool,
    pub error: Option<String>,
    pub related_products: Vec<Product>,
    pub loading_related_products: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub is_visible: bool,
    pub message: String,
    pub kind: ToastKind,
}

/// The single root state value owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
    pub categories: Categories,
    pub categories_error: Option<String>,
    pub pagination: Pagination,
    pub filters: Filters,
    pub cart: Cart,
    pub product_detail: ProductDetail,
    pub toast: Toast,
    pub current_route: String,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            loading: false,
            error: None,
            categories: Categories::new(),
            categories_error: None,
            pagination: Pagination::default(),
            filters: Filters::default(),
            cart: Cart::default(),
            product_detail: ProductDetail::default(),
            toast: Toast::default(),
            current_route: "/".to_string(),
        }
    }
}

impl ViewState for ApplicationState {}

impl ApplicationState {
    /// Initial state for a fresh session.
    ///
    /// `cart_items` comes from persistence; `limit` and `sort` from config.
    pub fn seeded(cart_items: Vec<CartItem>, limit: u32, sort: SortOrder) -> Self {
        Self {
            pagination: Pagination::derive(0, 1, limit),
            filters: Filters {
                sort,
                ..Filters::default()
            },
            cart: Cart {
                items: cart_items,
                is_modal_open: false,
            },
            ..Self::default()
        }
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.product_id == product_id)
    }
}
