//! Single source of truth for application state.
//!
//! The store holds the current state snapshot, runs the reducer for every
//! dispatched intent and notifies subscribers synchronously with the new
//! snapshot. Dispatching from inside a subscriber never interleaves with
//! the notification in progress: the intent is queued and applied once the
//! current round has reached every subscriber.

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};

use crate::mvi::{Intent, Reducer};
use crate::state::StorefrontReducer;

/// The store used by the storefront.
pub type StorefrontStore = Store<StorefrontReducer>;

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;
type ListenerList<S> = Mutex<Vec<(u64, Listener<S>)>>;

pub struct Store<R: Reducer> {
    state: Mutex<Arc<R::State>>,
    listeners: Arc<ListenerList<R::State>>,
    pending: Mutex<VecDeque<R::Intent>>,
    /// Held for a whole dispatch round. Re-entrant so a subscriber can
    /// queue follow-up intents; the flag tells it a round is running.
    dispatching: ReentrantMutex<Cell<bool>>,
    next_listener_id: AtomicU64,
}

impl<R: Reducer> Store<R> {
    pub fn new(initial: R::State) -> Self {
        Self {
            state: Mutex::new(Arc::new(initial)),
            listeners: Arc::new(Mutex::new(Vec::new())),
            pending: Mutex::new(VecDeque::new()),
            dispatching: ReentrantMutex::new(Cell::new(false)),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Current snapshot. Older snapshots stay valid after later dispatches.
    pub fn get_state(&self) -> Arc<R::State> {
        Arc::clone(&self.state.lock())
    }

    /// Apply `intent` and notify every subscriber.
    ///
    /// When called from a subscriber while a round is notifying, the intent
    /// is queued and applied, in order, after that round finishes. A
    /// dispatch from another thread waits for the running round and returns
    /// only once its own intent has been applied.
    pub fn dispatch(&self, intent: R::Intent) {
        let round = self.dispatching.lock();
        self.pending.lock().push_back(intent);
        if round.get() {
            return;
        }

        round.set(true);
        let _round = scopeguard::guard(round, |round| round.set(false));
        loop {
            let next = self.pending.lock().pop_front();
            let Some(intent) = next else {
                break;
            };
            self.apply(intent);
        }
    }

    fn apply(&self, intent: R::Intent) {
        let name = intent.name();
        let next = {
            let mut state = self.state.lock();
            let next = Arc::new(R::reduce((**state).clone(), intent));
            *state = Arc::clone(&next);
            next
        };
        tracing::debug!(action = name, "Action applied");

        let listeners: Vec<Listener<R::State>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&next);
        }
    }

    /// Register a listener called with the new state after every dispatch.
    #[must_use = "dropping the subscription keeps the listener registered with no way to remove it"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&R::State) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(listener)));

        let listeners: Weak<ListenerList<R::State>> = Arc::downgrade(&self.listeners);
        Subscription {
            remove: Box::new(move || {
                if let Some(listeners) = listeners.upgrade() {
                    listeners.lock().retain(|(listener_id, _)| *listener_id != id);
                }
            }),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Capability to remove exactly one store listener.
pub struct Subscription {
    remove: Box<dyn FnOnce() + Send + Sync>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        (self.remove)();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
