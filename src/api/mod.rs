//! Product data source.
//!
//! Controllers only see the [`ProductSource`] trait. [`InMemoryCatalog`]
//! is the bundled implementation used by the CLI and the tests.

mod catalog;
mod error;
mod source;

pub use catalog::{CatalogError, InMemoryCatalog};
pub use error::SourceError;
pub use source::{ProductPage, ProductQuery, ProductSource};
