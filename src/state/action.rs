//! The action vocabulary.
//!
//! Every state change in the storefront is one of these. Actions serialize
//! as `{"type": "PRODUCTS_LOADED", "payload": {...}}` so a recorded session
//! can be replayed; a `type` this build does not know decodes to
//! [`Action::Unknown`], which the reducer treats as a no-op.

use serde::{Deserialize, Serialize};

use crate::api::ProductPage;
use crate::mvi::Intent;
use crate::state::types::{Categories, FiltersPatch, Product, SortOrder, ToastKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // -- product list -------------------------------------------------------
    LoadInitialData,
    InitialDataLoaded {
        products: Vec<Product>,
        total: u64,
        categories: Categories,
    },
    LoadInitialDataError(String),
    LoadProducts,
    ProductsLoaded(ProductPage),
    /// Next page for infinite scroll; appended to the loaded products.
    MoreProductsLoaded {
        page: u32,
        products: Vec<Product>,
        total: u64,
    },
    LoadError(String),
    ChangeFilters(FiltersPatch),
    SearchProducts(String),
    ChangeSort(SortOrder),
    ChangeLimit(u32),
    /// Shrink the page size without refetching.
    SliceList(u32),

    // -- product detail -----------------------------------------------------
    LoadProductDetail,
    ProductDetailLoaded(Product),
    LoadProductDetailError(String),
    LoadRelatedProducts,
    RelatedProductsLoaded(Vec<Product>),

    // -- cart ---------------------------------------------------------------
    AddToCart {
        product_id: String,
        quantity: u32,
        stock: Option<u32>,
    },
    UpdateCartQuantity {
        product_id: String,
        quantity: u32,
        stock: Option<u32>,
    },
    RemoveFromCart(String),
    ClearCart,
    ToggleCartModal,
    CloseCartModal,

    // -- shell --------------------------------------------------------------
    Navigate(String),
    ShowToast {
        message: String,
        kind: ToastKind,
    },
    HideToast,

    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn navigate(path: impl Into<String>) -> Self {
        Action::Navigate(path.into())
    }

    pub fn show_toast(message: impl Into<String>) -> Self {
        Action::ShowToast {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn add_to_cart(product: &Product, quantity: u32) -> Self {
        Action::AddToCart {
            product_id: product.product_id.clone(),
            quantity,
            stock: product.stock,
        }
    }
}

impl Intent for Action {
    fn name(&self) -> &'static str {
        match self {
            Action::LoadInitialData => "LOAD_INITIAL_DATA",
            Action::InitialDataLoaded { .. } => "INITIAL_DATA_LOADED",
            Action::LoadInitialDataError(_) => "LOAD_INITIAL_DATA_ERROR",
            Action::LoadProducts => "LOAD_PRODUCTS",
            Action::ProductsLoaded(_) => "PRODUCTS_LOADED",
            Action::MoreProductsLoaded { .. } => "MORE_PRODUCTS_LOADED",
            Action::LoadError(_) => "LOAD_ERROR",
            Action::ChangeFilters(_) => "CHANGE_FILTERS",
            Action::SearchProducts(_) => "SEARCH_PRODUCTS",
            Action::ChangeSort(_) => "CHANGE_SORT",
            Action::ChangeLimit(_) => "CHANGE_LIMIT",
            Action::SliceList(_) => "SLICE_LIST",
            Action::LoadProductDetail => "LOAD_PRODUCT_DETAIL",
            Action::ProductDetailLoaded(_) => "PRODUCT_DETAIL_LOADED",
            Action::LoadProductDetailError(_) => "LOAD_PRODUCT_DETAIL_ERROR",
            Action::LoadRelatedProducts => "LOAD_RELATED_PRODUCTS",
            Action::RelatedProductsLoaded(_) => "RELATED_PRODUCTS_LOADED",
            Action::AddToCart { .. } => "ADD_TO_CART",
            Action::UpdateCartQuantity { .. } => "UPDATE_CART_QUANTITY",
            Action::RemoveFromCart(_) => "REMOVE_FROM_CART",
            Action::ClearCart => "CLEAR_CART",
            Action::ToggleCartModal => "TOGGLE_CART_MODAL",
            Action::CloseCartModal => "CLOSE_CART_MODAL",
            Action::Navigate(_) => "NAVIGATE",
            Action::ShowToast { .. } => "SHOW_TOAST",
            Action::HideToast => "HIDE_TOAST",
            Action::Unknown => "UNKNOWN",
        }
    }
}
