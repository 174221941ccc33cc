//! Product detail page controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::listeners::ListenerRegistry;
use super::{clamp_stepper, stepper_enabled, stepper_max, stepper_value, ControllerContext};
use crate::api::ProductQuery;
use crate::diagnostics::Diagnostic;
use crate::dom::{Event, EventKind};
use crate::route::Route;
use crate::state::{Action, Product};

/// Drives one product detail page.
///
/// ```text
/// Idle ─→ Loading ─┬─→ Loaded ─→ LoadingRelated ─┬─→ RelatedLoaded
///                  │                             └─→ RelatedFailed (silent)
///                  └─→ Failed (until load_product restarts)
/// ```
///
/// Every primary load takes a new generation; a result is applied only if
/// its generation and product id are still the current ones.
pub struct ProductDetailController {
    ctx: ControllerContext,
    product_id: Mutex<String>,
    generation: AtomicU64,
    listeners: Mutex<ListenerRegistry>,
}

impl ProductDetailController {
    pub fn new(ctx: ControllerContext, product_id: impl Into<String>) -> Arc<Self> {
        let listeners = ListenerRegistry::new(Arc::clone(&ctx.document));
        Arc::new(Self {
            ctx,
            product_id: Mutex::new(product_id.into()),
            generation: AtomicU64::new(0),
            listeners: Mutex::new(listeners),
        })
    }

    pub fn product_id(&self) -> String {
        self.product_id.lock().clone()
    }

    pub async fn initialize(&self) {
        self.load_product_detail().await;
    }

    /// Switch to another product and load it, superseding any load in flight.
    pub async fn load_product(&self, product_id: impl Into<String>) {
        *self.product_id.lock() = product_id.into();
        self.load_product_detail().await;
    }

    pub async fn load_product_detail(&self) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let product_id = self.product_id();

        self.ctx.store.dispatch(Action::LoadProductDetail);
        let result = self.ctx.source.get_product(&product_id).await;

        if !self.is_current(ticket, &product_id) {
            self.ctx.diagnostics.record(Diagnostic::StaleResultDiscarded {
                subject: product_id,
            });
            return;
        }

        match result {
            Ok(product) => {
                self.ctx
                    .store
                    .dispatch(Action::ProductDetailLoaded(product.clone()));
                self.load_related_products(&product).await;
            }
            Err(e) => {
                let message = e.to_string();
                self.ctx.diagnostics.record(Diagnostic::ProductDetailLoadFailed {
                    product_id,
                    message: message.clone(),
                });
                self.ctx
                    .store
                    .dispatch(Action::LoadProductDetailError(message));
            }
        }
    }

    /// Load products sharing `product`'s categories.
    ///
    /// Skipped entirely when the product has no primary category. A failure
    /// is reported as a diagnostic and leaves the related list empty.
    pub async fn load_related_products(&self, product: &Product) {
        let Some(query) = ProductQuery::related_to(product) else {
            return;
        };
        let ticket = self.generation.load(Ordering::SeqCst);

        self.ctx.store.dispatch(Action::LoadRelatedProducts);
        let result = self.ctx.source.get_products(&query).await;

        if !self.is_current(ticket, &product.product_id) {
            self.ctx.diagnostics.record(Diagnostic::StaleResultDiscarded {
                subject: format!("related:{}", product.product_id),
            });
            return;
        }

        let related = match result {
            Ok(page) => page
                .products
                .into_iter()
                .filter(|p| p.product_id != product.product_id)
                .collect(),
            Err(e) => {
                self.ctx
                    .diagnostics
                    .record(Diagnostic::RelatedProductsLoadFailed {
                        product_id: product.product_id.clone(),
                        message: e.to_string(),
                    });
                Vec::new()
            }
        };
        self.ctx
            .store
            .dispatch(Action::RelatedProductsLoaded(related));
    }

    fn is_current(&self, ticket: u64, product_id: &str) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket && *self.product_id.lock() == product_id
    }

    // -- listeners ------------------------------------------------------------

    /// Replace this controller's document listeners with a fresh set.
    pub fn setup_event_listeners(self: &Arc<Self>) {
        let mut registry = self.listeners.lock();
        registry.detach_all();

        let this = Arc::downgrade(self);
        registry.attach(EventKind::Click, move |event| {
            if let Some(controller) = this.upgrade() {
                controller.on_click(event);
            }
        });
        for kind in [EventKind::Change, EventKind::Input] {
            let this = Arc::downgrade(self);
            registry.attach(kind, move |event| {
                if let Some(controller) = this.upgrade() {
                    controller.on_quantity_edit(event);
                }
            });
        }
    }

    /// Detach every listener and drop the results of loads still in
    /// flight. Safe to call any number of times.
    pub fn cleanup(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().detach_all();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn on_click(&self, event: &Event) {
        if self.ctx.handle_shell_click(event) {
            return;
        }

        let document = &self.ctx.document;
        let target = event.target();

        if document.closest(target, ".cart-modal").is_some() {
            return;
        }
        if document.closest(target, "#quantity-decrease").is_some() {
            event.prevent_default();
            event.stop_propagation();
            self.step_quantity(false);
            return;
        }
        if document.closest(target, "#quantity-increase").is_some() {
            event.prevent_default();
            event.stop_propagation();
            self.step_quantity(true);
            return;
        }
        if document.matches(target, "#add-to-cart-btn") {
            self.add_to_cart();
            return;
        }
        if document.matches(target, ".breadcrumb-link") {
            event.prevent_default();
            let category1 = document.data(target, "category1");
            let category2 = document.data(target, "category2");
            self.ctx.navigate(Route::list_with_categories(
                category1.as_deref(),
                category2.as_deref(),
            ));
            return;
        }
        if document.matches(target, ".go-to-product-list") {
            self.ctx.navigate("/");
            return;
        }
        if let Some(card) = document.closest(target, ".related-product-card") {
            if let Some(product_id) = document.data(card, "product-id") {
                self.ctx.navigate(Route::product(&product_id));
            }
        }
    }

    fn on_quantity_edit(&self, event: &Event) {
        let document = &self.ctx.document;
        let input = event.target();
        if !document.matches(input, "#quantity-input") || !stepper_enabled(document, input) {
            return;
        }
        let max = stepper_max(document, input);
        let validated = clamp_stepper(stepper_value(document, input), max).to_string();
        if document.value(input).as_deref() != Some(validated.as_str()) {
            document.set_value(input, validated);
        }
    }

    fn step_quantity(&self, up: bool) {
        let document = &self.ctx.document;
        let Some(input) = document
            .get_element_by_id("quantity-input")
            .filter(|input| stepper_enabled(document, *input))
        else {
            return;
        };
        let current = stepper_value(document, input);
        let next = if up {
            current.saturating_add(1)
        } else {
            current.saturating_sub(1)
        };
        document.set_value(input, clamp_stepper(next, stepper_max(document, input)).to_string());
    }

    fn add_to_cart(&self) {
        let state = self.ctx.store.get_state();
        let detail = &state.product_detail;
        let product = match &detail.product {
            Some(product) if !detail.loading => product,
            _ => {
                self.ctx.diagnostics.record(Diagnostic::ProductNotLoaded);
                return;
            }
        };

        let document = &self.ctx.document;
        let quantity = document
            .get_element_by_id("quantity-input")
            .map(|input| stepper_value(document, input))
            .unwrap_or(1);

        self.ctx.add_to_cart(product, quantity);
    }
}
