//! Structured diagnostics for failures that never reach the state tree.
//!
//! Controllers report soft failures, stale results and guarded programmer
//! errors through an injected [`DiagnosticSink`] instead of logging
//! directly, so tests can assert on exactly what was reported.

use std::fmt;

use parking_lot::Mutex;

/// Something worth telling an operator about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Primary product list load failed (also recorded in state).
    ProductListLoadFailed { message: String },
    /// Primary product detail load failed (also recorded in state).
    ProductDetailLoadFailed { product_id: String, message: String },
    /// Related products could not be loaded; the view simply shows none.
    RelatedProductsLoadFailed { product_id: String, message: String },
    /// An async result arrived for a subject that is no longer active.
    StaleResultDiscarded { subject: String },
    /// Add-to-cart was attempted before the product finished loading.
    ProductNotLoaded,
    /// Writing the cart back to storage failed.
    CartPersistFailed { message: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::ProductListLoadFailed { .. }
            | Diagnostic::ProductDetailLoadFailed { .. }
            | Diagnostic::CartPersistFailed { .. } => Severity::Error,
            Diagnostic::RelatedProductsLoadFailed { .. } | Diagnostic::ProductNotLoaded => {
                Severity::Warn
            }
            Diagnostic::StaleResultDiscarded { .. } => Severity::Debug,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ProductListLoadFailed { message } => {
                write!(f, "Product list load failed: {}", message)
            }
            Diagnostic::ProductDetailLoadFailed {
                product_id,
                message,
            } => write!(f, "Product detail load failed for {}: {}", product_id, message),
            Diagnostic::RelatedProductsLoadFailed {
                product_id,
                message,
            } => write!(f, "Related products load failed for {}: {}", product_id, message),
            Diagnostic::StaleResultDiscarded { subject } => {
                write!(f, "Discarded stale load result for {}", subject)
            }
            Diagnostic::ProductNotLoaded => {
                f.write_str("Add to cart ignored: product not loaded yet")
            }
            Diagnostic::CartPersistFailed { message } => {
                write!(f, "Failed to persist cart: {}", message)
            }
        }
    }
}

/// How loudly a diagnostic is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Warn,
    Error,
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => tracing::error!("{}", diagnostic),
            Severity::Warn => tracing::warn!("{}", diagnostic),
            Severity::Debug => tracing::debug!("{}", diagnostic),
        }
    }
}

/// Keeps every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
        self.events.lock().iter().filter(|d| predicate(d)).count()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        self.events.lock().push(diagnostic);
    }
}
