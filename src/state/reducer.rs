//! Reducer for the application state tree.

use crate::mvi::Reducer;

use super::action::Action;
use super::types::{ApplicationState, CartItem, Pagination, Product, Toast};

/// The single reducer for [`ApplicationState`].
pub struct StorefrontReducer;

impl Reducer for StorefrontReducer {
    type State = ApplicationState;
    type Intent = Action;

    fn reduce(mut state: Self::State, action: Self::Intent) -> Self::State {
        match action {
            // -- product list ---------------------------------------------------
            Action::LoadInitialData => {
                state.loading = true;
                state.error = None;
                state.categories_error = None;
            }
            Action::InitialDataLoaded {
                products,
                total,
                categories,
            } => {
                state.products = products;
                state.categories = categories;
                state.loading = false;
                state.error = None;
                state.pagination = state.pagination.first_page(total);
            }
            Action::LoadInitialDataError(message) => {
                state.loading = false;
                state.error = Some(message.clone());
                state.categories_error = Some(message);
            }
            Action::LoadProducts => {
                state.loading = true;
                state.error = None;
            }
            Action::ProductsLoaded(page) => {
                state.products = page.products;
                state.loading = false;
                state.error = None;
                state.pagination = state.pagination.first_page(page.total);
            }
            Action::MoreProductsLoaded {
                page,
                products,
                total,
            } => {
                state.products.extend(products);
                state.loading = false;
                state.error = None;
                state.pagination = Pagination::derive(total, page, state.pagination.limit);
            }
            Action::LoadError(message) => {
                state.loading = false;
                state.error = Some(message);
            }
            Action::ChangeFilters(patch) => {
                state.filters = patch.apply(state.filters);
                state.pagination = state.pagination.with(1, state.pagination.limit);
            }
            Action::SearchProducts(term) => {
                state.filters.search = term;
                state.pagination = state.pagination.with(1, state.pagination.limit);
            }
            Action::ChangeSort(sort) => {
                state.filters.sort = sort;
                state.pagination = state.pagination.with(1, state.pagination.limit);
            }
            Action::ChangeLimit(limit) => {
                state.pagination = state.pagination.with(1, limit);
            }
            Action::SliceList(limit) => {
                state.products.truncate(limit as usize);
                state.pagination = state.pagination.with(1, limit);
            }

            // -- product detail -------------------------------------------------
            Action::LoadProductDetail => {
                state.product_detail.loading = true;
                state.product_detail.error = None;
            }
            Action::ProductDetailLoaded(product) => {
                let detail = &mut state.product_detail;
                detail.product = Some(product);
                detail.loading = false;
                detail.error = None;
                detail.related_products = Vec::new();
                detail.loading_related_products = false;
            }
            Action::LoadProductDetailError(message) => {
                state.product_detail.loading = false;
                state.product_detail.error = Some(message);
            }
            Action::LoadRelatedProducts => {
                state.product_detail.loading_related_products = true;
            }
            Action::RelatedProductsLoaded(products) => {
                let detail = &mut state.product_detail;
                let viewing = detail.product.as_ref().map(|p| p.product_id.as_str());
                detail.related_products = exclude(products, viewing);
                detail.loading_related_products = false;
            }

            // -- cart -----------------------------------------------------------
            Action::AddToCart {
                product_id,
                quantity,
                stock,
            } => {
                let items = &mut state.cart.items;
                match items.iter_mut().find(|item| item.product_id == product_id) {
                    Some(item) => {
                        let wanted = item.quantity.saturating_add(quantity);
                        if let Some(quantity) = clamp_quantity(wanted, stock) {
                            item.quantity = quantity;
                        }
                    }
                    None => {
                        if let Some(quantity) = clamp_quantity(quantity, stock) {
                            items.push(CartItem {
                                product_id,
                                quantity,
                            });
                        }
                    }
                }
            }
            Action::UpdateCartQuantity {
                product_id,
                quantity,
                stock,
            } => {
                let clamped = clamp_quantity(quantity, stock);
                if let (Some(item), Some(quantity)) = (
                    state
                        .cart
                        .items
                        .iter_mut()
                        .find(|item| item.product_id == product_id),
                    clamped,
                ) {
                    item.quantity = quantity;
                }
            }
            Action::RemoveFromCart(product_id) => {
                state.cart.items.retain(|item| item.product_id != product_id);
            }
            Action::ClearCart => {
                state.cart.items.clear();
            }
            Action::ToggleCartModal => {
                state.cart.is_modal_open = !state.cart.is_modal_open;
            }
            Action::CloseCartModal => {
                state.cart.is_modal_open = false;
            }

            // -- shell ----------------------------------------------------------
            Action::Navigate(path) => {
                state.current_route = path;
            }
            Action::ShowToast { message, kind } => {
                state.toast = Toast {
                    is_visible: true,
                    message,
                    kind,
                };
            }
            Action::HideToast => {
                state.toast.is_visible = false;
            }

            Action::Unknown => {}
        }
        state
    }
}

impl Pagination {
    /// A fresh result set replaces whatever pages were appended before.
    fn first_page(&self, total: u64) -> Self {
        Pagination::derive(total, 1, self.limit)
    }
}

/// Clamp a requested quantity to `[1, stock]`.
///
/// Returns `None` when nothing can be added because stock is zero.
fn clamp_quantity(quantity: u32, stock: Option<u32>) -> Option<u32> {
    match stock {
        Some(0) => None,
        Some(stock) => Some(quantity.clamp(1, stock)),
        None => Some(quantity.max(1)),
    }
}

fn exclude(products: Vec<Product>, product_id: Option<&str>) -> Vec<Product> {
    match product_id {
        Some(id) => products.into_iter().filter(|p| p.product_id != id).collect(),
        None => products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_stock() {
        assert_eq!(clamp_quantity(3, Some(2)), Some(2));
        assert_eq!(clamp_quantity(0, Some(2)), Some(1));
        assert_eq!(clamp_quantity(5, None), Some(5));
        assert_eq!(clamp_quantity(0, None), Some(1));
        assert_eq!(clamp_quantity(1, Some(0)), None);
    }

    #[test]
    fn unknown_action_is_identity() {
        let state = ApplicationState::default();
        let next = StorefrontReducer::reduce(state.clone(), Action::Unknown);
        assert_eq!(next, state);
    }

    #[test]
    fn reload_after_appending_returns_to_first_page() {
        let mut state = ApplicationState::default();
        state.pagination = Pagination::derive(5, 2, 2);

        let next = StorefrontReducer::reduce(
            state,
            Action::ProductsLoaded(crate::api::ProductPage {
                products: Vec::new(),
                total: 5,
            }),
        );
        assert_eq!(next.pagination, Pagination::derive(5, 1, 2));
        assert!(!next.pagination.has_prev);
    }

    #[test]
    fn toggle_modal_only_flips_flag() {
        let state = ApplicationState::default();
        let opened = StorefrontReducer::reduce(state.clone(), Action::ToggleCartModal);
        assert!(opened.cart.is_modal_open);
        assert_eq!(opened.cart.items, state.cart.items);
        let closed = StorefrontReducer::reduce(opened, Action::ToggleCartModal);
        assert_eq!(closed, state);
    }
}
