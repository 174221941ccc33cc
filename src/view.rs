//! Rendering: state in, element tree out.
//!
//! The element ids and classes produced here are the contract with the
//! controllers' delegated handlers (`#quantity-input`, `.product-card`, ...).

use crate::dom::Element;
use crate::route::Route;
use crate::state::{ApplicationState, Product, SortOrder, ToastKind};

/// Page sizes offered by the list view.
pub const PAGE_LIMITS: [u32; 4] = [10, 20, 50, 100];

/// Stock bound used by the quantity stepper when the product has none.
pub const UNBOUNDED_STOCK: u32 = 999;

pub trait Renderer: Send + Sync {
    fn render(&self, state: &ApplicationState) -> Element;
}

/// Default storefront markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct StorefrontView;

impl Renderer for StorefrontView {
    fn render(&self, state: &ApplicationState) -> Element {
        let page = match Route::parse(&state.current_route) {
            Route::ProductList { .. } => product_list(state),
            Route::ProductDetail { .. } => product_detail(state),
            Route::NotFound { path } => not_found(&path),
        };

        let mut root = Element::new("div").id("root").child(header(state)).child(page);
        if state.cart.is_modal_open {
            root = root.child(cart_modal(state));
        }
        if state.toast.is_visible {
            root = root.child(toast(state));
        }
        root
    }
}

fn header(state: &ApplicationState) -> Element {
    Element::new("header")
        .child(Element::new("h1").class("logo").text("Storefront"))
        .child(
            Element::new("button")
                .id("cart-icon-btn")
                .text(format!("Cart ({})", state.cart.items.len())),
        )
}

fn product_list(state: &ApplicationState) -> Element {
    let filters = &state.filters;
    let mut page = Element::new("main").class("product-list-page").child(
        Element::new("input")
            .id("search-input")
            .attr("placeholder", "Search products")
            .value(filters.search.clone()),
    );

    page = page.child(category_filters(state));
    page = page.child(
        Element::new("select")
            .id("sort-select")
            .value(filters.sort.as_str())
            .children(SortOrder::ALL.iter().map(|sort| {
                Element::new("option")
                    .attr("value", sort.as_str())
                    .text(sort.as_str())
            })),
    );
    page = page.child(
        Element::new("select")
            .id("limit-select")
            .value(state.pagination.limit.to_string())
            .children(PAGE_LIMITS.iter().map(|limit| {
                Element::new("option")
                    .attr("value", limit.to_string())
                    .text(limit.to_string())
            })),
    );

    page = page.child(
        Element::new("p")
            .class("product-count")
            .text(format!("{} products", state.pagination.total)),
    );

    if let Some(error) = &state.error {
        page = page.child(Element::new("div").class("error-message").text(error.clone()));
    }

    page = page.child(
        Element::new("div")
            .id("products-grid")
            .children(state.products.iter().map(product_card)),
    );

    if state.loading {
        page = page.child(Element::new("div").class("loading").text("Loading..."));
    } else if state.pagination.has_next {
        page = page.child(Element::new("button").id("load-more-btn").text("Load more"));
    }
    page
}

fn category_filters(state: &ApplicationState) -> Element {
    let filters = &state.filters;
    let mut container = Element::new("div").class("category-filters");

    if filters.category1.is_empty() {
        return container.children(state.categories.keys().map(|category1| {
            Element::new("button")
                .class("category1-filter-btn")
                .data("category1", category1.clone())
                .text(category1.clone())
        }));
    }

    container = container
        .child(Element::new("button").class("breadcrumb-reset").text("All"))
        .child(
            Element::new("button")
                .class("category1-filter-btn")
                .data("category1", filters.category1.clone())
                .text(filters.category1.clone()),
        );
    if let Some(children) = state.categories.get(&filters.category1) {
        container = container.children(children.iter().map(|category2| {
            let mut button = Element::new("button")
                .class("category2-filter-btn")
                .data("category1", filters.category1.clone())
                .data("category2", category2.clone())
                .text(category2.clone());
            if *category2 == filters.category2 {
                button = button.class("selected");
            }
            button
        }));
    }
    container
}

fn product_card(product: &Product) -> Element {
    Element::new("div")
        .class("product-card")
        .data("product-id", product.product_id.clone())
        .child(
            Element::new("img")
                .class("product-image")
                .attr("src", product.image.clone()),
        )
        .child(Element::new("h3").class("product-title").text(product.title.clone()))
        .child(Element::new("span").class("product-price").text(product.price.to_string()))
        .child(
            Element::new("button")
                .class("add-to-cart-btn")
                .data("product-id", product.product_id.clone())
                .text("Add to cart"),
        )
}

fn product_detail(state: &ApplicationState) -> Element {
    let detail = &state.product_detail;
    let page = Element::new("main").class("product-detail-page");

    if detail.loading {
        return page.child(Element::new("div").class("loading").text("Loading..."));
    }
    if let Some(error) = &detail.error {
        return page
            .child(Element::new("div").class("error-message").text(error.clone()))
            .child(
                Element::new("button")
                    .class("go-to-product-list")
                    .text("Back to products"),
            );
    }
    let Some(product) = &detail.product else {
        return page;
    };

    let max = product.stock.unwrap_or(UNBOUNDED_STOCK);
    let sold_out = max == 0;
    let mut page = page
        .child(breadcrumb(product))
        .child(Element::new("h1").class("product-title").text(product.title.clone()))
        .child(Element::new("span").class("product-price").text(product.price.to_string()))
        .child(
            Element::new("div")
                .class("quantity-selector")
                .child(disable_if(
                    Element::new("button").id("quantity-decrease").text("-"),
                    sold_out,
                ))
                .child(disable_if(
                    Element::new("input")
                        .id("quantity-input")
                        .attr("min", "1")
                        .attr("max", max.to_string())
                        .value("1"),
                    sold_out,
                ))
                .child(disable_if(
                    Element::new("button").id("quantity-increase").text("+"),
                    sold_out,
                )),
        )
        .child(disable_if(
            Element::new("button")
                .id("add-to-cart-btn")
                .data("product-id", product.product_id.clone())
                .text(if sold_out { "Out of stock" } else { "Add to cart" }),
            sold_out,
        ))
        .child(
            Element::new("button")
                .class("go-to-product-list")
                .text("Back to products"),
        );

    if detail.loading_related_products {
        page = page.child(Element::new("div").class("loading").text("Loading related..."));
    } else if !detail.related_products.is_empty() {
        page = page.child(
            Element::new("section").class("related-products").children(
                detail.related_products.iter().map(|related| {
                    Element::new("div")
                        .class("related-product-card")
                        .data("product-id", related.product_id.clone())
                        .child(
                            Element::new("img")
                                .class("product-image")
                                .attr("src", related.image.clone()),
                        )
                        .child(Element::new("h4").text(related.title.clone()))
                }),
            ),
        );
    }
    page
}

fn disable_if(element: Element, disabled: bool) -> Element {
    if disabled {
        element.attr("disabled", "disabled")
    } else {
        element
    }
}

fn breadcrumb(product: &Product) -> Element {
    let mut nav = Element::new("nav").class("breadcrumb");
    if let Some(category1) = &product.category1 {
        nav = nav.child(
            Element::new("a")
                .class("breadcrumb-link")
                .data("category1", category1.clone())
                .text(category1.clone()),
        );
        if let Some(category2) = &product.category2 {
            nav = nav.child(
                Element::new("a")
                    .class("breadcrumb-link")
                    .data("category1", category1.clone())
                    .data("category2", category2.clone())
                    .text(category2.clone()),
            );
        }
    }
    nav
}

fn not_found(path: &str) -> Element {
    Element::new("main")
        .class("not-found-page")
        .child(Element::new("h1").text(format!("No page at {}", path)))
        .child(
            Element::new("button")
                .class("go-to-product-list")
                .text("Back to products"),
        )
}

fn cart_modal(state: &ApplicationState) -> Element {
    let lines = state.cart.items.iter().map(|item| {
        let title = state
            .product(&item.product_id)
            .map(|p| p.title.clone())
            .unwrap_or_else(|| item.product_id.clone());
        Element::new("li")
            .class("cart-item")
            .data("product-id", item.product_id.clone())
            .text(format!("{} x {}", title, item.quantity))
    });
    Element::new("div")
        .class("cart-modal")
        .child(Element::new("ul").class("cart-items").children(lines))
        .child(Element::new("button").id("cart-modal-close-btn").text("Close"))
}

fn toast(state: &ApplicationState) -> Element {
    let kind = match state.toast.kind {
        ToastKind::Success => "toast-success",
        ToastKind::Info => "toast-info",
        ToastKind::Error => "toast-error",
    };
    Element::new("div")
        .class("toast")
        .class(kind)
        .text(state.toast.message.clone())
}
