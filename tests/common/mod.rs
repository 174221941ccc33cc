//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, Semaphore};

use storefront::api::{InMemoryCatalog, ProductPage, ProductQuery, ProductSource, SourceError};
use storefront::app::UiCommand;
use storefront::controller::ControllerContext;
use storefront::diagnostics::{Diagnostic, MemorySink};
use storefront::dom::Document;
use storefront::state::{ApplicationState, Categories, Product};
use storefront::store::{StorefrontStore, Subscription};
use storefront::view::{Renderer, StorefrontView};

/// Gate key used for `get_products` calls.
pub const LIST_GATE: &str = "__list__";

pub fn product(
    id: &str,
    title: &str,
    price: u64,
    stock: Option<u32>,
    category1: Option<&str>,
    category2: Option<&str>,
) -> Product {
    Product {
        product_id: id.to_string(),
        title: title.to_string(),
        price,
        image: format!("https://img.example/{}.jpg", id),
        stock,
        brand: None,
        category1: category1.map(str::to_string),
        category2: category2.map(str::to_string),
    }
}

/// Small catalog: three lamps sharing categories, a mug, and a gift card
/// without any category.
pub fn fixture_products() -> Vec<Product> {
    vec![
        product("lamp-1", "Desk Lamp", 150, Some(3), Some("home"), Some("lighting")),
        product("lamp-2", "Floor Lamp", 320, Some(10), Some("home"), Some("lighting")),
        product("lamp-3", "Clip Lamp", 90, None, Some("home"), Some("lighting")),
        product("mug-1", "Coffee Mug", 40, Some(0), Some("home"), Some("kitchen")),
        product("gift", "Gift Card", 500, None, None, None),
    ]
}

/// Catalog-backed source with per-call gates, failure switches and call
/// counters.
///
/// A gated key blocks every call for it until [`release`](Self::release)
/// hands out a permit. Product calls are keyed by product id; list calls use
/// [`LIST_GATE`].
pub struct TestSource {
    catalog: InMemoryCatalog,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    arrived: AtomicUsize,
    pub fail_product: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_categories: AtomicBool,
    pub product_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub category_calls: AtomicUsize,
}

impl TestSource {
    pub fn new(products: Vec<Product>) -> Arc<Self> {
        Arc::new(Self {
            catalog: InMemoryCatalog::new(products).expect("fixture ids are unique"),
            gates: Mutex::new(HashMap::new()),
            arrived: AtomicUsize::new(0),
            fail_product: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            fail_categories: AtomicBool::new(false),
            product_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            category_calls: AtomicUsize::new(0),
        })
    }

    pub fn fixture() -> Arc<Self> {
        Self::new(fixture_products())
    }

    /// Block calls for `key` until released.
    pub fn gate(&self, key: &str) {
        self.gates
            .lock()
            .insert(key.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let one blocked call for `key` through.
    pub fn release(&self, key: &str) {
        if let Some(gate) = self.gates.lock().get(key) {
            gate.add_permits(1);
        }
    }

    /// Yield until `count` calls have reached a gate.
    pub async fn wait_for_arrivals(&self, count: usize) {
        while self.arrived.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    async fn pass(&self, key: &str) {
        let gate = self.gates.lock().get(key).cloned();
        if let Some(gate) = gate {
            self.arrived.fetch_add(1, Ordering::SeqCst);
            gate.acquire().await.expect("gate closed").forget();
        }
    }
}

#[async_trait]
impl ProductSource for TestSource {
    async fn get_product(&self, product_id: &str) -> Result<Product, SourceError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.pass(product_id).await;
        if self.fail_product.load(Ordering::SeqCst) {
            return Err(SourceError::unavailable("product endpoint down"));
        }
        self.catalog.get_product(product_id).await
    }

    async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pass(LIST_GATE).await;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(SourceError::unavailable("list endpoint down"));
        }
        self.catalog.get_products(query).await
    }

    async fn get_categories(&self) -> Result<Categories, SourceError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_categories.load(Ordering::SeqCst) {
            return Err(SourceError::unavailable("category endpoint down"));
        }
        self.catalog.get_categories().await
    }
}

/// A store, a document re-rendered on every dispatch and a controller
/// context around them, without the app runtime.
pub struct Harness {
    pub ctx: ControllerContext,
    pub store: Arc<StorefrontStore>,
    pub document: Arc<Document>,
    pub diagnostics: Arc<MemorySink>,
    pub source: Arc<TestSource>,
    pub commands: mpsc::UnboundedReceiver<UiCommand>,
    _render: Subscription,
}

impl Harness {
    pub fn new(source: Arc<TestSource>) -> Self {
        Self::with_state(source, ApplicationState::default())
    }

    /// Harness whose page is rendered for `path`.
    pub fn on_route(source: Arc<TestSource>, path: &str) -> Self {
        let state = ApplicationState {
            current_route: path.to_string(),
            ..ApplicationState::default()
        };
        Self::with_state(source, state)
    }

    pub fn with_state(source: Arc<TestSource>, state: ApplicationState) -> Self {
        let store = Arc::new(StorefrontStore::new(state));
        let document = Arc::new(Document::new());
        document.mount(StorefrontView.render(&store.get_state()));

        let render_target = Arc::clone(&document);
        let render = store.subscribe(move |state| {
            render_target.mount(StorefrontView.render(state));
        });

        let diagnostics = Arc::new(MemorySink::new());
        let (sender, commands) = mpsc::unbounded_channel();
        let ctx = ControllerContext {
            store: Arc::clone(&store),
            document: Arc::clone(&document),
            source: source.clone(),
            diagnostics: diagnostics.clone(),
            commands: sender,
        };

        Self {
            ctx,
            store,
            document,
            diagnostics,
            source,
            commands,
            _render: render,
        }
    }

    pub fn state(&self) -> Arc<ApplicationState> {
        self.store.get_state()
    }

    /// Commands sent so far, oldest first.
    pub fn drain_commands(&mut self) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            commands.push(command);
        }
        commands
    }

    pub fn stale_count(&self) -> usize {
        self.diagnostics
            .count(|d| matches!(d, Diagnostic::StaleResultDiscarded { .. }))
    }
}
