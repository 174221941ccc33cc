//! The mounted element tree and its document-level listener table.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::element::Element;
use super::event::{Event, EventKind};

/// Handle to a mounted element.
///
/// Handles are tied to the mount that produced them: once the tree is
/// replaced, old handles resolve to nothing instead of to whatever element
/// now sits at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    value: Option<String>,
    parent: Option<usize>,
}

struct Tree {
    generation: u64,
    nodes: Vec<Node>,
    source: Element,
}

struct Registered {
    id: ListenerId,
    kind: EventKind,
    handler: Handler,
}

/// Simple selectors: `#id`, `.class` or a bare tag name.
enum Selector<'a> {
    Id(&'a str),
    Class(&'a str),
    Tag(&'a str),
}

impl<'a> Selector<'a> {
    fn parse(selector: &'a str) -> Self {
        if let Some(id) = selector.strip_prefix('#') {
            Selector::Id(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            Selector::Class(class)
        } else {
            Selector::Tag(selector)
        }
    }

    fn matches(&self, node: &Node) -> bool {
        match self {
            Selector::Id(id) => node.id.as_deref() == Some(*id),
            Selector::Class(class) => node.classes.iter().any(|c| c == class),
            Selector::Tag(tag) => node.tag == *tag,
        }
    }
}

/// A page: one mounted tree that is replaced wholesale on every render,
/// plus listeners attached at the document itself.
///
/// Listeners outlive any particular tree, which is what lets delegated
/// handlers keep working after a re-render.
pub struct Document {
    tree: Mutex<Tree>,
    listeners: Mutex<Vec<Registered>>,
    next_listener_id: AtomicU64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Element::new("body");
        Self {
            tree: Mutex::new(Tree {
                generation: 0,
                nodes: flatten(&body),
                source: body,
            }),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Replace the whole tree. Every previously issued [`NodeId`] goes stale.
    pub fn mount(&self, root: Element) {
        let mut tree = self.tree.lock();
        tree.generation += 1;
        tree.nodes = flatten(&root);
        tree.source = root;
    }

    /// The tree as last mounted.
    pub fn snapshot(&self) -> Element {
        self.tree.lock().source.clone()
    }

    pub fn mount_count(&self) -> u64 {
        self.tree.lock().generation
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_selector(&format!("#{}", id))
    }

    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        let tree = self.tree.lock();
        tree.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| selector.matches(node))
            .map(|(index, _)| NodeId {
                index,
                generation: tree.generation,
            })
            .collect()
    }

    /// Nearest node, starting at `node` itself, matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector);
        let tree = self.tree.lock();
        let mut current = resolve(&tree, node).map(|_| node.index);
        while let Some(index) = current {
            let candidate = &tree.nodes[index];
            if selector.matches(candidate) {
                return Some(NodeId {
                    index,
                    generation: tree.generation,
                });
            }
            current = candidate.parent;
        }
        None
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> bool {
        let tree = self.tree.lock();
        resolve(&tree, node).is_some_and(|n| Selector::parse(selector).matches(n))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.lock();
        resolve(&tree, node).and_then(|n| n.attributes.get(name).cloned())
    }

    /// `data-*` attribute lookup.
    pub fn data(&self, node: NodeId, key: &str) -> Option<String> {
        self.attribute(node, &format!("data-{}", key))
    }

    pub fn value(&self, node: NodeId) -> Option<String> {
        let tree = self.tree.lock();
        resolve(&tree, node).and_then(|n| n.value.clone())
    }

    /// Set a form value. Returns `false` when `node` is stale.
    pub fn set_value(&self, node: NodeId, value: impl Into<String>) -> bool {
        let mut tree = self.tree.lock();
        if resolve(&tree, node).is_none() {
            return false;
        }
        tree.nodes[node.index].value = Some(value.into());
        true
    }

    // -- listeners ------------------------------------------------------------

    pub fn add_event_listener<F>(&self, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push(Registered {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|registered| registered.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|registered| registered.kind == kind)
            .count()
    }

    /// Deliver `event` to the listeners registered for its kind.
    ///
    /// The set of listeners is fixed when delivery starts. Listeners removed
    /// while the event is in flight are skipped; listeners added meanwhile
    /// only see later events. No lock is held while a handler runs.
    pub fn dispatch_event(&self, event: Event) -> Event {
        let scheduled: Vec<ListenerId> = self
            .listeners
            .lock()
            .iter()
            .filter(|registered| registered.kind == event.kind())
            .map(|registered| registered.id)
            .collect();

        for id in scheduled {
            if event.propagation_stopped() {
                break;
            }
            let handler = self
                .listeners
                .lock()
                .iter()
                .find(|registered| registered.id == id)
                .map(|registered| Arc::clone(&registered.handler));
            if let Some(handler) = handler {
                handler(&event);
            }
        }
        event
    }

    // -- interaction helpers --------------------------------------------------

    pub fn click(&self, node: NodeId) -> Event {
        self.dispatch_event(Event::new(EventKind::Click, node))
    }

    /// Click the first element matching `selector`, if any.
    pub fn click_selector(&self, selector: &str) -> Option<Event> {
        self.query_selector(selector).map(|node| self.click(node))
    }

    /// Type into a field: set its value, then fire `input`.
    pub fn input(&self, node: NodeId, value: impl Into<String>) -> Event {
        self.set_value(node, value);
        self.dispatch_event(Event::new(EventKind::Input, node))
    }

    /// Commit a field value: set it, then fire `change`.
    pub fn change(&self, node: NodeId, value: impl Into<String>) -> Event {
        self.set_value(node, value);
        self.dispatch_event(Event::new(EventKind::Change, node))
    }

    pub fn key_down(&self, node: NodeId, key: &str) -> Event {
        self.dispatch_event(Event::key_down(node, key))
    }
}

fn resolve(tree: &Tree, node: NodeId) -> Option<&Node> {
    if node.generation != tree.generation {
        return None;
    }
    tree.nodes.get(node.index)
}

fn flatten(root: &Element) -> Vec<Node> {
    let mut nodes = Vec::new();
    push_node(&mut nodes, root, None);
    nodes
}

fn push_node(nodes: &mut Vec<Node>, element: &Element, parent: Option<usize>) {
    let index = nodes.len();
    nodes.push(Node {
        tag: element.tag.clone(),
        id: element.id.clone(),
        classes: element.classes.clone(),
        attributes: element.attributes.clone(),
        value: element.value.clone(),
        parent,
    });
    for child in &element.children {
        push_node(nodes, child, Some(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn page() -> Element {
        Element::new("main").child(
            Element::new("div")
                .class("product-card")
                .data("product-id", "42")
                .child(Element::new("img").class("product-image"))
                .child(Element::new("button").id("buy").class("add-to-cart-btn")),
        )
    }

    #[test]
    fn closest_walks_up_from_target() {
        let doc = Document::new();
        doc.mount(page());
        let image = doc.query_selector(".product-image").unwrap();
        let card = doc.closest(image, ".product-card").unwrap();
        assert_eq!(doc.data(card, "product-id").as_deref(), Some("42"));
        assert!(doc.closest(image, ".cart-modal").is_none());
    }

    #[test]
    fn closest_includes_the_node_itself() {
        let doc = Document::new();
        doc.mount(page());
        let button = doc.get_element_by_id("buy").unwrap();
        assert_eq!(doc.closest(button, "#buy"), Some(button));
    }

    #[test]
    fn remount_invalidates_old_handles() {
        let doc = Document::new();
        doc.mount(Element::new("input").id("q").value("1"));
        let old = doc.get_element_by_id("q").unwrap();
        doc.mount(Element::new("input").id("q").value("1"));
        assert!(!doc.set_value(old, "5"));
        assert_eq!(doc.value(old), None);
        let fresh = doc.get_element_by_id("q").unwrap();
        assert_eq!(doc.value(fresh).as_deref(), Some("1"));
    }

    #[test]
    fn listeners_survive_remount() {
        let doc = Document::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        doc.add_event_listener(EventKind::Click, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        doc.mount(page());
        doc.click_selector("#buy");
        doc.mount(page());
        doc.click_selector("#buy");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let doc = Document::new();
        doc.mount(page());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = doc.add_event_listener(EventKind::Click, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(doc.remove_event_listener(id));
        assert!(!doc.remove_event_listener(id));
        doc.click_selector("#buy");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listener_added_during_dispatch_waits_for_next_event() {
        let doc = Arc::new(Document::new());
        doc.mount(page());
        let hits = Arc::new(AtomicUsize::new(0));

        let inner_doc = Arc::clone(&doc);
        let inner_hits = Arc::clone(&hits);
        doc.add_event_listener(EventKind::Click, move |_| {
            let counter = Arc::clone(&inner_hits);
            inner_doc.add_event_listener(EventKind::Click, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        doc.click_selector("#buy");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        doc.click_selector("#buy");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_propagation_skips_remaining_listeners() {
        let doc = Document::new();
        doc.mount(page());
        let hits = Arc::new(AtomicUsize::new(0));
        doc.add_event_listener(EventKind::Click, |event| event.stop_propagation());
        let counter = Arc::clone(&hits);
        doc.add_event_listener(EventKind::Click, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let event = doc.click_selector("#buy").unwrap();
        assert!(event.propagation_stopped());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
