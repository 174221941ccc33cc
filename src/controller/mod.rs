//! Controllers: async load orchestration and delegated event handling.
//!
//! A controller dispatches a loading action, awaits the data source and
//! dispatches the terminal action, discarding results for a subject that
//! is no longer current. Its event handlers are attached at the document
//! and rebound after every render through a [`ListenerRegistry`].

pub mod listeners;
mod product_detail;
mod product_list;

use std::sync::Arc;

pub use listeners::ListenerRegistry;
pub use product_detail::ProductDetailController;
pub use product_list::ProductListController;

use crate::api::ProductSource;
use crate::app::{UiCommand, UiCommandSender};
use crate::diagnostics::DiagnosticSink;
use crate::dom::{Document, Event, NodeId};
use crate::state::{Action, Product, ToastKind};
use crate::store::StorefrontStore;
use crate::view::UNBOUNDED_STOCK;

/// Everything a controller talks to.
#[derive(Clone)]
pub struct ControllerContext {
    pub store: Arc<StorefrontStore>,
    pub document: Arc<Document>,
    pub source: Arc<dyn ProductSource>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
    pub commands: UiCommandSender,
}

impl ControllerContext {
    fn navigate(&self, path: impl Into<String>) {
        self.store.dispatch(Action::navigate(path));
    }

    fn request(&self, command: UiCommand) {
        // The runtime is gone only during shutdown; nothing left to do then.
        let _ = self.commands.send(command);
    }

    /// Put `quantity` of `product` in the cart and confirm with a toast.
    fn add_to_cart(&self, product: &Product, quantity: u32) {
        if product.stock == Some(0) {
            self.store.dispatch(Action::ShowToast {
                message: format!("{} is out of stock", product.title),
                kind: ToastKind::Error,
            });
            return;
        }
        self.store.dispatch(Action::add_to_cart(product, quantity));
        self.store.dispatch(Action::show_toast("Added to cart"));
    }

    /// Header and cart modal clicks, handled the same on every page.
    ///
    /// Returns `true` when the click was consumed.
    fn handle_shell_click(&self, event: &Event) -> bool {
        let document = &self.document;
        let target = event.target();
        if document.closest(target, "#cart-icon-btn").is_some() {
            self.store.dispatch(Action::ToggleCartModal);
            return true;
        }
        if document.closest(target, "#cart-modal-close-btn").is_some() {
            self.store.dispatch(Action::CloseCartModal);
            return true;
        }
        false
    }
}

/// The controller bound to the current route.
#[derive(Clone, Default)]
pub enum ActiveController {
    #[default]
    None,
    List(Arc<ProductListController>),
    Detail(Arc<ProductDetailController>),
}

impl ActiveController {
    pub fn setup_event_listeners(&self) {
        match self {
            ActiveController::None => {}
            ActiveController::List(controller) => controller.setup_event_listeners(),
            ActiveController::Detail(controller) => controller.setup_event_listeners(),
        }
    }

    pub fn cleanup(&self) {
        match self {
            ActiveController::None => {}
            ActiveController::List(controller) => controller.cleanup(),
            ActiveController::Detail(controller) => controller.cleanup(),
        }
    }
}

// -- quantity stepper -------------------------------------------------------
//
// Stepper bounds live in the DOM (`max` attribute) and are read at the
// moment of interaction; they never enter the state tree.

fn stepper_max(document: &Document, input: NodeId) -> u32 {
    document
        .attribute(input, "max")
        .and_then(|max| max.trim().parse::<u32>().ok())
        .unwrap_or(UNBOUNDED_STOCK)
}

/// A disabled stepper (sold out) accepts no edits.
fn stepper_enabled(document: &Document, input: NodeId) -> bool {
    document.attribute(input, "disabled").is_none()
}

fn stepper_value(document: &Document, input: NodeId) -> u32 {
    document
        .value(input)
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(1)
}

fn clamp_stepper(value: u32, max: u32) -> u32 {
    value.clamp(1, max.max(1))
}
