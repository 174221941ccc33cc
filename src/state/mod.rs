//! Application state: the action vocabulary, the state tree and its reducer.

mod action;
mod reducer;
mod types;

pub use action::Action;
pub use reducer::StorefrontReducer;
pub use types::{
    ApplicationState, Cart, CartItem, Categories, Filters, FiltersPatch, Pagination, Product,
    ProductDetail, SortOrder, Toast, ToastKind, UnknownSortOrder, DEFAULT_PAGE_LIMIT,
};
