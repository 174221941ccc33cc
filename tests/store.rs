//! Tests for the store: dispatch/notify ordering, re-entrancy and
//! subscription independence.

mod common;

use std::sync::Arc;

use common::*;
use parking_lot::Mutex;
use storefront::api::ProductPage;
use storefront::mvi::replay;
use storefront::state::{Action, ApplicationState, FiltersPatch, SortOrder, StorefrontReducer};
use storefront::store::StorefrontStore;

fn session() -> Vec<Action> {
    vec![
        Action::LoadInitialData,
        Action::ProductsLoaded(ProductPage {
            products: fixture_products(),
            total: 5,
        }),
        Action::ChangeFilters(FiltersPatch {
            category1: Some("home".into()),
            ..FiltersPatch::default()
        }),
        Action::ChangeSort(SortOrder::NameDesc),
        Action::add_to_cart(&fixture_products()[0], 5),
        Action::navigate("/product/lamp-1"),
        Action::show_toast("Added to cart"),
        Action::Unknown,
        Action::HideToast,
    ]
}

#[test]
fn store_state_equals_replay_of_dispatched_actions() {
    let store = StorefrontStore::new(ApplicationState::default());
    for action in session() {
        store.dispatch(action);
    }

    let replayed = replay::<StorefrontReducer, _>(ApplicationState::default(), session());
    assert_eq!(*store.get_state(), replayed);
    assert_eq!(replayed.cart.items[0].quantity, 3);
}

#[test]
fn subscribers_see_every_state_in_order() {
    let store = StorefrontStore::new(ApplicationState::default());
    let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = store.subscribe(move |state| sink.lock().push(state.cart.is_modal_open));

    store.dispatch(Action::ToggleCartModal);
    store.dispatch(Action::ToggleCartModal);
    store.dispatch(Action::CloseCartModal);

    assert_eq!(*seen.lock(), vec![true, false, false]);
}

#[test]
fn dispatch_from_subscriber_runs_after_current_round() {
    let store = Arc::new(StorefrontStore::new(ApplicationState::default()));
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let inner = Arc::clone(&store);
    let first_log = Arc::clone(&log);
    let _first = store.subscribe(move |state| {
        first_log.lock().push(format!("first:{}", state.current_route));
        if state.current_route == "/a" {
            inner.dispatch(Action::navigate("/b"));
        }
    });
    let second_log = Arc::clone(&log);
    let _second =
        store.subscribe(move |state| second_log.lock().push(format!("second:{}", state.current_route)));

    store.dispatch(Action::navigate("/a"));

    assert_eq!(
        *log.lock(),
        vec!["first:/a", "second:/a", "first:/b", "second:/b"]
    );
    assert_eq!(store.get_state().current_route, "/b");
}

#[test]
fn unsubscribe_removes_only_that_listener() {
    let store = StorefrontStore::new(ApplicationState::default());
    let counts = Arc::new(Mutex::new((0, 0)));

    let a = Arc::clone(&counts);
    let first = store.subscribe(move |_| a.lock().0 += 1);
    let b = Arc::clone(&counts);
    let _second = store.subscribe(move |_| b.lock().1 += 1);
    assert_eq!(store.subscriber_count(), 2);

    store.dispatch(Action::HideToast);
    first.unsubscribe();
    store.dispatch(Action::HideToast);

    assert_eq!(*counts.lock(), (1, 2));
    assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn listener_unsubscribed_mid_round_still_sees_that_round() {
    let store = Arc::new(StorefrontStore::new(ApplicationState::default()));
    let hits = Arc::new(Mutex::new(0));
    let slot: Arc<Mutex<Option<storefront::store::Subscription>>> = Arc::new(Mutex::new(None));

    let slot_for_first = Arc::clone(&slot);
    let _first = store.subscribe(move |_| {
        if let Some(subscription) = slot_for_first.lock().take() {
            subscription.unsubscribe();
        }
    });
    let counter = Arc::clone(&hits);
    *slot.lock() = Some(store.subscribe(move |_| *counter.lock() += 1));

    store.dispatch(Action::HideToast);
    store.dispatch(Action::HideToast);

    assert_eq!(*hits.lock(), 1);
    assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn dispatch_from_another_thread_waits_for_its_own_action() {
    let store = Arc::new(StorefrontStore::new(ApplicationState::default()));
    let (entered_tx, entered_rx) = std::sync::mpsc::channel();
    let entered = Mutex::new(Some(entered_tx));

    let _slow = store.subscribe(move |state| {
        if !state.cart.is_modal_open {
            return;
        }
        if let Some(tx) = entered.lock().take() {
            tx.send(()).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
    });

    let first = Arc::clone(&store);
    let worker = std::thread::spawn(move || first.dispatch(Action::ToggleCartModal));
    entered_rx.recv().unwrap();

    store.dispatch(Action::navigate("/elsewhere"));
    let state = store.get_state();
    assert_eq!(state.current_route, "/elsewhere");
    assert!(state.cart.is_modal_open);

    worker.join().unwrap();
}
