//! Scoped ownership of document listeners.

use std::sync::Arc;

use crate::dom::{Document, Event, EventKind, ListenerId};

/// The listeners one controller has attached to the document.
///
/// Everything attached through a registry is detached by
/// [`detach_all`](Self::detach_all) or, at the latest, when the registry is
/// dropped, so a discarded controller never leaves handlers behind on a
/// document that outlives it.
pub struct ListenerRegistry {
    document: Arc<Document>,
    attached: Vec<ListenerId>,
}

impl ListenerRegistry {
    pub fn new(document: Arc<Document>) -> Self {
        Self {
            document,
            attached: Vec::new(),
        }
    }

    pub fn attach<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.document.add_event_listener(kind, handler);
        self.attached.push(id);
    }

    /// Detach everything attached so far. Safe to call repeatedly.
    pub fn detach_all(&mut self) {
        for id in self.attached.drain(..) {
            self.document.remove_event_listener(id);
        }
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        self.detach_all();
    }
}
