//! Base trait for intents (actions) in MVI architecture.

/// Marker trait for intent objects.
///
/// Intents describe one state-changing event: a click, a finished fetch,
/// a route change. They are immutable once dispatched and are consumed by
/// value by the reducer.
pub trait Intent: Clone + std::fmt::Debug + Send + 'static {
    /// Stable name used for logging and diagnostics.
    fn name(&self) -> &'static str;
}
