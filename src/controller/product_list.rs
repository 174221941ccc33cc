//! Product list page controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::listeners::ListenerRegistry;
use super::ControllerContext;
use crate::api::ProductQuery;
use crate::app::UiCommand;
use crate::diagnostics::Diagnostic;
use crate::dom::{Event, EventKind};
use crate::route::Route;
use crate::state::{Action, Filters, FiltersPatch, SortOrder};

/// What a list load was issued for. A result is only applied while the
/// store still asks for the same thing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListSubject {
    filters: Filters,
    limit: u32,
}

pub struct ProductListController {
    ctx: ControllerContext,
    generation: AtomicU64,
    listeners: Mutex<ListenerRegistry>,
}

impl ProductListController {
    pub fn new(ctx: ControllerContext) -> Arc<Self> {
        let listeners = ListenerRegistry::new(Arc::clone(&ctx.document));
        Arc::new(Self {
            ctx,
            generation: AtomicU64::new(0),
            listeners: Mutex::new(listeners),
        })
    }

    /// First load for the page. Categories are fetched only once per session.
    pub async fn initialize(&self) {
        if self.ctx.store.get_state().categories.is_empty() {
            self.load_initial_data().await;
        } else {
            self.reload().await;
        }
    }

    /// Fetch the first page and the category tree together.
    pub async fn load_initial_data(&self) {
        let (ticket, subject) = self.begin();
        self.ctx.store.dispatch(Action::LoadInitialData);

        let query = ProductQuery::from_filters(&subject.filters, 1, subject.limit);
        let (products, categories) = tokio::join!(
            self.ctx.source.get_products(&query),
            self.ctx.source.get_categories()
        );

        if !self.is_current(ticket, &subject) {
            self.discard(&subject);
            return;
        }

        match (products, categories) {
            (Ok(page), Ok(categories)) => {
                self.ctx.store.dispatch(Action::InitialDataLoaded {
                    products: page.products,
                    total: page.total,
                    categories,
                });
            }
            (Err(e), _) | (_, Err(e)) => {
                let message = e.to_string();
                self.ctx.diagnostics.record(Diagnostic::ProductListLoadFailed {
                    message: message.clone(),
                });
                self.ctx
                    .store
                    .dispatch(Action::LoadInitialDataError(message));
            }
        }
    }

    /// Refetch the first page for the current filters and limit.
    pub async fn reload(&self) {
        let (ticket, subject) = self.begin();
        self.ctx.store.dispatch(Action::LoadProducts);

        let query = ProductQuery::from_filters(&subject.filters, 1, subject.limit);
        let result = self.ctx.source.get_products(&query).await;

        if !self.is_current(ticket, &subject) {
            self.discard(&subject);
            return;
        }

        match result {
            Ok(page) => self.ctx.store.dispatch(Action::ProductsLoaded(page)),
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Append the next page. Does nothing while a load is running or when
    /// the last page is already shown.
    pub async fn load_next_page(&self) {
        let state = self.ctx.store.get_state();
        if state.loading || !state.pagination.has_next {
            return;
        }
        let next_page = state.pagination.page + 1;
        drop(state);

        let (ticket, subject) = self.begin();
        self.ctx.store.dispatch(Action::LoadProducts);

        let query = ProductQuery::from_filters(&subject.filters, next_page, subject.limit);
        let result = self.ctx.source.get_products(&query).await;

        if !self.is_current(ticket, &subject) {
            self.discard(&subject);
            return;
        }

        match result {
            Ok(page) => self.ctx.store.dispatch(Action::MoreProductsLoaded {
                page: next_page,
                products: page.products,
                total: page.total,
            }),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn begin(&self) -> (u64, ListSubject) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (ticket, self.subject())
    }

    fn subject(&self) -> ListSubject {
        let state = self.ctx.store.get_state();
        ListSubject {
            filters: state.filters.clone(),
            limit: state.pagination.limit,
        }
    }

    fn is_current(&self, ticket: u64, subject: &ListSubject) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket && self.subject() == *subject
    }

    fn discard(&self, subject: &ListSubject) {
        self.ctx.diagnostics.record(Diagnostic::StaleResultDiscarded {
            subject: format!(
                "list:{}:{}:{}:{}",
                subject.filters.search,
                subject.filters.category1,
                subject.filters.category2,
                subject.filters.sort
            ),
        });
    }

    fn fail(&self, message: String) {
        self.ctx.diagnostics.record(Diagnostic::ProductListLoadFailed {
            message: message.clone(),
        });
        self.ctx.store.dispatch(Action::LoadError(message));
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
        let this = Arc::downgrade(self);
        registry.attach(EventKind::Change, move |event| {
            if let Some(controller) = this.upgrade() {
                controller.on_change(event);
            }
        });
        let this = Arc::downgrade(self);
        registry.attach(EventKind::KeyDown, move |event| {
            if let Some(controller) = this.upgrade() {
                controller.on_key_down(event);
            }
        });
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
        if let Some(button) = document.closest(target, ".add-to-cart-btn") {
            event.stop_propagation();
            if let Some(product_id) = document.data(button, "product-id") {
                self.add_to_cart(&product_id);
            }
            return;
        }
        if let Some(button) = document.closest(target, ".category1-filter-btn") {
            self.change_filters(FiltersPatch {
                category1: document.data(button, "category1"),
                category2: Some(String::new()),
                ..FiltersPatch::default()
            });
            return;
        }
        if let Some(button) = document.closest(target, ".category2-filter-btn") {
            self.change_filters(FiltersPatch {
                category1: document.data(button, "category1"),
                category2: document.data(button, "category2"),
                ..FiltersPatch::default()
            });
            return;
        }
        if document.matches(target, ".breadcrumb-reset") {
            self.change_filters(FiltersPatch {
                category1: Some(String::new()),
                category2: Some(String::new()),
                ..FiltersPatch::default()
            });
            return;
        }
        if document.matches(target, "#load-more-btn") {
            self.ctx.request(UiCommand::LoadNextPage);
            return;
        }
        if let Some(card) = document.closest(target, ".product-card") {
            if let Some(product_id) = document.data(card, "product-id") {
                self.ctx.navigate(Route::product(&product_id));
            }
        }
    }

    fn on_change(&self, event: &Event) {
        let document = &self.ctx.document;
        let target = event.target();
        let value = document.value(target).unwrap_or_default();

        if document.matches(target, "#sort-select") {
            if let Ok(sort) = value.parse::<SortOrder>() {
                self.ctx.store.dispatch(Action::ChangeSort(sort));
                self.ctx.request(UiCommand::ReloadProducts);
            }
            return;
        }
        if document.matches(target, "#limit-select") {
            if let Some(limit) = value.trim().parse::<u32>().ok().filter(|l| *l > 0) {
                self.change_limit(limit);
            }
        }
    }

    fn on_key_down(&self, event: &Event) {
        let document = &self.ctx.document;
        let target = event.target();
        if event.key() != Some("Enter") || !document.matches(target, "#search-input") {
            return;
        }
        let term = document.value(target).unwrap_or_default().trim().to_string();
        self.ctx.store.dispatch(Action::SearchProducts(term));
        self.ctx.request(UiCommand::ReloadProducts);
    }

    fn change_filters(&self, patch: FiltersPatch) {
        self.ctx.store.dispatch(Action::ChangeFilters(patch));
        self.ctx.request(UiCommand::ReloadProducts);
    }

    /// Shrinking below what is already loaded needs no fetch.
    fn change_limit(&self, limit: u32) {
        let state = self.ctx.store.get_state();
        if limit == state.pagination.limit {
            return;
        }
        let loaded = state.products.len();
        drop(state);

        if loaded > 0 && (limit as usize) <= loaded {
            self.ctx.store.dispatch(Action::SliceList(limit));
        } else {
            self.ctx.store.dispatch(Action::ChangeLimit(limit));
            self.ctx.request(UiCommand::ReloadProducts);
        }
    }

    fn add_to_cart(&self, product_id: &str) {
        let state = self.ctx.store.get_state();
        let Some(product) = state.product(product_id) else {
            self.ctx.diagnostics.record(Diagnostic::ProductNotLoaded);
            return;
        };
        self.ctx.add_to_cart(product, 1);
    }
}
