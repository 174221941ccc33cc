//! Headless application runtime.
//!
//! `App` owns the store, the document and the controller bound to the
//! current route. A single store subscriber re-renders the page after every
//! action and rebinds the active controller's listeners; anything that
//! needs to await (loads, route switches, toast timers) is requested over a
//! [`UiCommand`] channel and executed by [`App::run_until_idle`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::api::ProductSource;
use crate::config::Config;
use crate::controller::{
    ActiveController, ControllerContext, ProductDetailController, ProductListController,
};
use crate::diagnostics::DiagnosticSink;
use crate::dom::Document;
use crate::route::Route;
use crate::state::{Action, ApplicationState, Toast};
use crate::storage::{restore_cart, CartPersistence, CartStorage};
use crate::store::{StorefrontStore, Subscription};
use crate::view::{Renderer, StorefrontView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// The route changed; bind and initialize its controller.
    RouteChanged(String),
    /// Refetch the product list for the current filters.
    ReloadProducts,
    /// Append the next product page.
    LoadNextPage,
    /// A toast became visible; hide it after the configured delay.
    ScheduleToastHide,
}

pub type UiCommandSender = mpsc::UnboundedSender<UiCommand>;

pub struct App {
    store: Arc<StorefrontStore>,
    ctx: ControllerContext,
    renderer: Arc<dyn Renderer>,
    active: Arc<Mutex<ActiveController>>,
    commands: mpsc::UnboundedReceiver<UiCommand>,
    loads: JoinSet<()>,
    timers: JoinSet<()>,
    toast_duration: Duration,
    toast_ticket: Arc<AtomicU64>,
    subscription: Option<Subscription>,
    persistence: Option<CartPersistence>,
}

impl App {
    /// Build an app with its state seeded from `config` and the stored cart.
    pub fn new(
        config: &Config,
        source: Arc<dyn ProductSource>,
        storage: Arc<dyn CartStorage>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let initial = ApplicationState::seeded(
            restore_cart(storage.as_ref()),
            config.catalog.page_limit,
            config.catalog.default_sort,
        );
        let store = Arc::new(StorefrontStore::new(initial));
        let persistence = CartPersistence::attach(&store, storage, Arc::clone(&diagnostics));

        let (sender, commands) = mpsc::unbounded_channel();
        let ctx = ControllerContext {
            store: Arc::clone(&store),
            document: Arc::new(Document::new()),
            source,
            diagnostics,
            commands: sender,
        };

        Self {
            store,
            ctx,
            renderer: Arc::new(StorefrontView),
            active: Arc::new(Mutex::new(ActiveController::None)),
            commands,
            loads: JoinSet::new(),
            timers: JoinSet::new(),
            toast_duration: config.toast_duration(),
            toast_ticket: Arc::new(AtomicU64::new(0)),
            subscription: None,
            persistence: Some(persistence),
        }
    }

    pub fn store(&self) -> &Arc<StorefrontStore> {
        &self.store
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.ctx.document
    }

    pub fn active(&self) -> ActiveController {
        self.active.lock().clone()
    }

    /// Render the current state and navigate to `path`.
    pub fn start(&mut self, path: &str) {
        if self.subscription.is_none() {
            self.subscription = Some(self.subscribe_view());
        }
        let state = self.store.get_state();
        self.ctx.document.mount(self.renderer.render(&state));
        tracing::info!(path, "Starting storefront");
        self.store.dispatch(Action::navigate(path));
    }

    /// Top-level subscriber: render, detect route changes, rebind listeners.
    fn subscribe_view(&self) -> Subscription {
        let document = Arc::clone(&self.ctx.document);
        let renderer = Arc::clone(&self.renderer);
        let active = Arc::clone(&self.active);
        let commands = self.ctx.commands.clone();
        let last_route: Mutex<Option<String>> = Mutex::new(None);
        let last_toast: Mutex<Toast> = Mutex::new(Toast::default());

        self.store.subscribe(move |state: &ApplicationState| {
            document.mount(renderer.render(state));

            let route_changed = {
                let mut last = last_route.lock();
                let changed = last.as_deref() != Some(state.current_route.as_str());
                if changed {
                    *last = Some(state.current_route.clone());
                }
                changed
            };

            let controller = active.lock().clone();
            if route_changed {
                controller.cleanup();
                let _ = commands.send(UiCommand::RouteChanged(state.current_route.clone()));
            } else {
                controller.setup_event_listeners();
            }

            let mut toast = last_toast.lock();
            if state.toast.is_visible && *toast != state.toast {
                let _ = commands.send(UiCommand::ScheduleToastHide);
            }
            *toast = state.toast.clone();
        })
    }

    /// Execute queued commands and await every load they start, until no
    /// work is left. Pending toast timers are not waited for.
    pub async fn run_until_idle(&mut self) {
        loop {
            let mut handled = false;
            while let Ok(command) = self.commands.try_recv() {
                self.handle_command(command);
                handled = true;
            }
            match self.loads.join_next().await {
                Some(Err(e)) if e.is_panic() => {
                    tracing::error!(error = %e, "Load task panicked");
                }
                Some(_) => {}
                None if handled => {}
                None => break,
            }
        }
    }

    fn handle_command(&mut self, command: UiCommand) {
        tracing::debug!(?command, "Handling command");
        match command {
            UiCommand::RouteChanged(path) => self.switch_route(&path),
            UiCommand::ReloadProducts => {
                if let ActiveController::List(controller) = self.active() {
                    self.loads.spawn(async move { controller.reload().await });
                }
            }
            UiCommand::LoadNextPage => {
                if let ActiveController::List(controller) = self.active() {
                    self.loads
                        .spawn(async move { controller.load_next_page().await });
                }
            }
            UiCommand::ScheduleToastHide => {
                let ticket = self.toast_ticket.fetch_add(1, Ordering::SeqCst) + 1;
                let current = Arc::clone(&self.toast_ticket);
                let store = Arc::clone(&self.store);
                let delay = self.toast_duration;
                self.timers.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if current.load(Ordering::SeqCst) == ticket {
                        store.dispatch(Action::HideToast);
                    }
                });
            }
        }
    }

    fn switch_route(&mut self, path: &str) {
        // A later navigation already superseded this one.
        if self.store.get_state().current_route != path {
            return;
        }
        // Unbind first: the filter actions below re-render, and the old
        // controller must not pick its listeners back up.
        let previous = std::mem::take(&mut *self.active.lock());
        previous.cleanup();

        let next = match Route::parse(path) {
            Route::ProductList { filters, limit } => {
                if !filters.is_empty() {
                    self.store.dispatch(Action::ChangeFilters(filters));
                }
                if let Some(limit) = limit {
                    if limit != self.store.get_state().pagination.limit {
                        self.store.dispatch(Action::ChangeLimit(limit));
                    }
                }
                let controller = ProductListController::new(self.ctx.clone());
                let task = Arc::clone(&controller);
                self.loads.spawn(async move { task.initialize().await });
                ActiveController::List(controller)
            }
            Route::ProductDetail { product_id } => match previous {
                ActiveController::Detail(controller) => {
                    let task = Arc::clone(&controller);
                    self.loads
                        .spawn(async move { task.load_product(product_id).await });
                    ActiveController::Detail(controller)
                }
                _ => {
                    let controller = ProductDetailController::new(self.ctx.clone(), product_id);
                    let task = Arc::clone(&controller);
                    self.loads.spawn(async move { task.initialize().await });
                    ActiveController::Detail(controller)
                }
            },
            Route::NotFound { path } => {
                tracing::info!(%path, "No page for route");
                ActiveController::None
            }
        };

        tracing::info!(path, "Route changed");
        *self.active.lock() = next.clone();
        next.setup_event_listeners();
    }

    /// Stop rendering, detach every listener and abort outstanding work.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(persistence) = self.persistence.take() {
            persistence.detach();
        }
        let active = std::mem::take(&mut *self.active.lock());
        active.cleanup();
        self.loads.abort_all();
        self.timers.abort_all();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
