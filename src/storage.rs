//! Cart persistence.
//!
//! The cart is read once at startup to seed the state tree. Writing back is
//! not the store's job: [`CartPersistence`] subscribes to the store and
//! saves whenever the cart lines change.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::state::CartItem;
use crate::store::{StorefrontStore, Subscription};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read cart file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cart file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cart file '{path}' is not valid: {source}")]
    FormatError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where cart lines live between sessions.
pub trait CartStorage: Send + Sync {
    fn load(&self) -> Result<Vec<CartItem>, StorageError>;

    fn save(&self, items: &[CartItem]) -> Result<(), StorageError>;
}

/// Cart lines as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileCartStorage {
    path: PathBuf,
}

impl JsonFileCartStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for JsonFileCartStorage {
    /// A missing file is an empty cart.
    fn load(&self) -> Result<Vec<CartItem>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ReadError {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| StorageError::FormatError {
            path: self.path.clone(),
            source: e,
        })
    }

    fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(items).map_err(|e| StorageError::FormatError {
            path: self.path.clone(),
            source: e,
        })?;

        fs::write(&self.path, json).map_err(|e| StorageError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Keeps the cart in memory only.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    items: Mutex<Vec<CartItem>>,
    saves: Mutex<usize>,
}

impl MemoryCartStorage {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self {
            items: Mutex::new(items),
            saves: Mutex::new(0),
        }
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.items.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Result<Vec<CartItem>, StorageError> {
        Ok(self.items())
    }

    fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
        *self.items.lock() = items.to_vec();
        *self.saves.lock() += 1;
        Ok(())
    }
}

/// Read the persisted cart, falling back to an empty one.
///
/// An unreadable or corrupt cart must not keep the storefront from
/// starting; the problem is logged and the session starts empty. Lines with
/// no quantity are dropped and repeated product ids are merged into the
/// first line for that product.
pub fn restore_cart(storage: &dyn CartStorage) -> Vec<CartItem> {
    let stored = match storage.load() {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Could not restore cart, starting empty");
            return Vec::new();
        }
    };

    let stored_lines = stored.len();
    let mut items: Vec<CartItem> = Vec::with_capacity(stored_lines);
    for line in stored.into_iter().filter(|line| line.quantity > 0) {
        match items.iter_mut().find(|item| item.product_id == line.product_id) {
            Some(item) => item.quantity = item.quantity.saturating_add(line.quantity),
            None => items.push(line),
        }
    }
    if items.len() != stored_lines {
        tracing::warn!(
            stored = stored_lines,
            kept = items.len(),
            "Dropped or merged invalid cart lines"
        );
    }
    items
}

/// Store subscriber writing the cart back whenever its lines change.
pub struct CartPersistence {
    subscription: Subscription,
}

impl CartPersistence {
    pub fn attach(
        store: &StorefrontStore,
        storage: Arc<dyn CartStorage>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let last_saved = Mutex::new(store.get_state().cart.items.clone());
        let subscription = store.subscribe(move |state| {
            let mut last = last_saved.lock();
            if *last == state.cart.items {
                return;
            }
            match storage.save(&state.cart.items) {
                Ok(()) => *last = state.cart.items.clone(),
                Err(e) => diagnostics.record(Diagnostic::CartPersistFailed {
                    message: e.to_string(),
                }),
            }
        });
        Self { subscription }
    }

    pub fn detach(self) {
        self.subscription.unsubscribe();
    }
}
