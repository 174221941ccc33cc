mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{CartConfig, CatalogConfig, Config, ToastConfig};
