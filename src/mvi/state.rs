//! Base trait for view state in MVI architecture.

/// Marker trait for state trees driven by a reducer.
///
/// States must be cheap to compare (`PartialEq`) so subscribers can detect
/// which sub-tree changed, and shareable across tasks (`Send + Sync`) since
/// snapshots are handed out behind an `Arc`.
pub trait ViewState: Clone + PartialEq + Default + Send + Sync + 'static {}
