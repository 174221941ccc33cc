//! Reducer trait for MVI architecture.

use super::intent::Intent;
use super::state::ViewState;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Intent) -> State
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: ViewState;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Process an intent and return the new state.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}

/// Fold a sequence of intents over an initial state.
///
/// A store that applied the same intents in the same order must hold
/// exactly this value.
pub fn replay<R, I>(initial: R::State, intents: I) -> R::State
where
    R: Reducer,
    I: IntoIterator<Item = R::Intent>,
{
    intents.into_iter().fold(initial, R::reduce)
}
