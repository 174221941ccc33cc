//! Tests for the storefront reducer's state transitions.

mod common;

use common::*;
use storefront::api::ProductPage;
use storefront::mvi::Reducer;
use storefront::state::{
    Action, ApplicationState, CartItem, FiltersPatch, Pagination, SortOrder, StorefrontReducer,
};

fn reduce(state: ApplicationState, action: Action) -> ApplicationState {
    StorefrontReducer::reduce(state, action)
}

fn loaded(total: u64) -> ApplicationState {
    reduce(
        ApplicationState::default(),
        Action::ProductsLoaded(ProductPage {
            products: fixture_products(),
            total,
        }),
    )
}

// -- load lifecycle ----------------------------------------------------------

#[test]
fn loading_clears_error_and_keeps_data() {
    let failed = reduce(loaded(5), Action::LoadError("boom".into()));
    assert_eq!(failed.error.as_deref(), Some("boom"));

    let loading = reduce(failed.clone(), Action::LoadProducts);
    assert!(loading.loading);
    assert!(loading.error.is_none());
    assert_eq!(loading.products, failed.products);
    assert_eq!(loading.filters, failed.filters);
}

#[test]
fn errors_leave_loaded_data_untouched() {
    let before = reduce(loaded(5), Action::LoadProducts);
    let after = reduce(before.clone(), Action::LoadError("timeout".into()));

    assert!(!after.loading);
    assert_eq!(after.products, before.products);
    assert_eq!(after.pagination, before.pagination);
    assert_eq!(after.error.as_deref(), Some("timeout"));
}

#[test]
fn single_product_fits_one_page() {
    let state = reduce(
        ApplicationState::default(),
        Action::ProductsLoaded(ProductPage {
            products: fixture_products().into_iter().take(1).collect(),
            total: 1,
        }),
    );
    assert_eq!(
        state.pagination,
        Pagination {
            total: 1,
            page: 1,
            limit: 20,
            total_pages: 1,
            has_next: false,
            has_prev: false,
        }
    );
}

#[test]
fn more_products_append_and_move_page() {
    let mut state = ApplicationState::seeded(Vec::new(), 2, SortOrder::PriceAsc);
    state = reduce(
        state,
        Action::ProductsLoaded(ProductPage {
            products: fixture_products()[..2].to_vec(),
            total: 5,
        }),
    );
    state = reduce(
        state,
        Action::MoreProductsLoaded {
            page: 2,
            products: fixture_products()[2..4].to_vec(),
            total: 5,
        },
    );
    assert_eq!(state.products.len(), 4);
    assert_eq!(state.pagination.page, 2);
    assert!(state.pagination.has_next);
    assert!(state.pagination.has_prev);
}

#[test]
fn initial_data_error_marks_categories_too() {
    let state = reduce(
        reduce(ApplicationState::default(), Action::LoadInitialData),
        Action::LoadInitialDataError("down".into()),
    );
    assert_eq!(state.error.as_deref(), Some("down"));
    assert_eq!(state.categories_error.as_deref(), Some("down"));
    assert!(!state.loading);
}

// -- filters -----------------------------------------------------------------

#[test]
fn filter_changes_reset_to_first_page() {
    let mut state = loaded(100);
    state.pagination = state.pagination.with(4, 20);

    let patched = reduce(
        state.clone(),
        Action::ChangeFilters(FiltersPatch {
            category1: Some("home".into()),
            ..FiltersPatch::default()
        }),
    );
    assert_eq!(patched.pagination.page, 1);
    assert_eq!(patched.filters.category1, "home");
    assert_eq!(patched.filters.sort, state.filters.sort);

    let searched = reduce(state.clone(), Action::SearchProducts("lamp".into()));
    assert_eq!(searched.pagination.page, 1);
    assert_eq!(searched.filters.search, "lamp");

    let sorted = reduce(state, Action::ChangeSort(SortOrder::NameAsc));
    assert_eq!(sorted.pagination.page, 1);
    assert_eq!(sorted.filters.sort, SortOrder::NameAsc);
}

#[test]
fn change_limit_recomputes_pages() {
    let state = reduce(loaded(45), Action::ChangeLimit(10));
    assert_eq!(state.pagination.limit, 10);
    assert_eq!(state.pagination.total_pages, 5);
    assert_eq!(state.pagination.page, 1);
    assert_eq!(state.products.len(), 5);
}

#[test]
fn slice_list_truncates_loaded_products() {
    let state = reduce(loaded(5), Action::SliceList(3));
    assert_eq!(state.products.len(), 3);
    assert_eq!(state.pagination.limit, 3);
    assert_eq!(state.pagination.total_pages, 2);
}

// -- product detail ----------------------------------------------------------

#[test]
fn related_products_exclude_the_viewed_product() {
    let products = fixture_products();
    let state = reduce(
        ApplicationState::default(),
        Action::ProductDetailLoaded(products[0].clone()),
    );
    let state = reduce(state, Action::LoadRelatedProducts);
    assert!(state.product_detail.loading_related_products);

    let state = reduce(state, Action::RelatedProductsLoaded(products[..3].to_vec()));
    let ids: Vec<&str> = state
        .product_detail
        .related_products
        .iter()
        .map(|p| p.product_id.as_str())
        .collect();
    assert_eq!(ids, vec!["lamp-2", "lamp-3"]);
    assert!(!state.product_detail.loading_related_products);
}

#[test]
fn new_product_replaces_related_products() {
    let products = fixture_products();
    let mut state = reduce(
        ApplicationState::default(),
        Action::ProductDetailLoaded(products[0].clone()),
    );
    state = reduce(state, Action::RelatedProductsLoaded(products[1..3].to_vec()));
    state = reduce(state, Action::ProductDetailLoaded(products[1].clone()));

    assert!(state.product_detail.related_products.is_empty());
    assert_eq!(
        state.product_detail.product.as_ref().map(|p| p.product_id.as_str()),
        Some("lamp-2")
    );
}

#[test]
fn detail_error_keeps_product() {
    let products = fixture_products();
    let state = reduce(
        ApplicationState::default(),
        Action::ProductDetailLoaded(products[0].clone()),
    );
    let state = reduce(state, Action::LoadProductDetail);
    let state = reduce(state, Action::LoadProductDetailError("gone".into()));

    assert!(!state.product_detail.loading);
    assert_eq!(state.product_detail.error.as_deref(), Some("gone"));
    assert_eq!(state.product_detail.product.as_ref(), Some(&products[0]));
}

// -- cart --------------------------------------------------------------------

#[test]
fn add_to_cart_clamps_to_stock() {
    let state = reduce(
        ApplicationState::default(),
        Action::AddToCart {
            product_id: "lamp-1".into(),
            quantity: 3,
            stock: Some(2),
        },
    );
    assert_eq!(
        state.cart.items,
        vec![CartItem {
            product_id: "lamp-1".into(),
            quantity: 2
        }]
    );

    let state = reduce(
        state,
        Action::AddToCart {
            product_id: "lamp-1".into(),
            quantity: 1,
            stock: Some(2),
        },
    );
    assert_eq!(state.cart.items[0].quantity, 2);
}

#[test]
fn add_to_cart_without_stock_is_unbounded() {
    let mut state = ApplicationState::default();
    for _ in 0..3 {
        state = reduce(
            state,
            Action::AddToCart {
                product_id: "gift".into(),
                quantity: 400,
                stock: None,
            },
        );
    }
    assert_eq!(state.cart.total_quantity(), 1200);
}

#[test]
fn out_of_stock_add_is_dropped() {
    let state = reduce(
        ApplicationState::default(),
        Action::AddToCart {
            product_id: "mug-1".into(),
            quantity: 1,
            stock: Some(0),
        },
    );
    assert!(state.cart.items.is_empty());
}

#[test]
fn update_quantity_sets_and_clamps() {
    let mut state = ApplicationState::default();
    state.cart.items.push(CartItem {
        product_id: "lamp-1".into(),
        quantity: 1,
    });

    let state = reduce(
        state,
        Action::UpdateCartQuantity {
            product_id: "lamp-1".into(),
            quantity: 9,
            stock: Some(3),
        },
    );
    assert_eq!(state.cart.items[0].quantity, 3);

    let state = reduce(
        state,
        Action::UpdateCartQuantity {
            product_id: "missing".into(),
            quantity: 2,
            stock: None,
        },
    );
    assert_eq!(state.cart.items.len(), 1);
}

#[test]
fn remove_and_clear_cart() {
    let mut state = ApplicationState::default();
    for id in ["a", "b"] {
        state = reduce(
            state,
            Action::AddToCart {
                product_id: id.into(),
                quantity: 1,
                stock: None,
            },
        );
    }
    state = reduce(state, Action::RemoveFromCart("a".into()));
    assert_eq!(state.cart.items.len(), 1);
    assert_eq!(state.cart.items[0].product_id, "b");

    state = reduce(state, Action::ClearCart);
    assert!(state.cart.items.is_empty());
}

// -- shell -------------------------------------------------------------------

#[test]
fn toast_show_and_hide() {
    let shown = reduce(ApplicationState::default(), Action::show_toast("Saved"));
    assert!(shown.toast.is_visible);
    assert_eq!(shown.toast.message, "Saved");

    let hidden = reduce(shown, Action::HideToast);
    assert!(!hidden.toast.is_visible);
}

#[test]
fn decoded_unknown_action_changes_nothing() {
    let action: Action = serde_json::from_str(r#"{"type":"APPLY_COUPON"}"#).unwrap();
    let state = loaded(5);
    assert_eq!(reduce(state.clone(), action), state);
}
