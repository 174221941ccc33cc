use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::state::{SortOrder, DEFAULT_PAGE_LIMIT};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cart: CartConfig,
    #[serde(default)]
    pub toast: ToastConfig,
}

/// Product list defaults used to seed the initial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Products per page (default: 20).
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// Initial sort order (default: price_asc).
    #[serde(default)]
    pub default_sort: SortOrder,
}

/// Cart persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Where the cart is stored. Defaults to the platform data directory.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

/// Toast notification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastConfig {
    /// How long a toast stays visible (default: 3000).
    #[serde(default = "default_toast_duration_ms")]
    pub duration_ms: u64,
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_toast_duration_ms() -> u64 {
    3000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            default_sort: SortOrder::default(),
        }
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_toast_duration_ms(),
        }
    }
}
