use thiserror::Error;

/// Errors a [`ProductSource`](super::ProductSource) can report.
///
/// The `Display` text is what ends up in `error` fields of the state tree,
/// so it is written for the shopper, not for the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Product '{product_id}' was not found")]
    NotFound { product_id: String },

    #[error("Product service unavailable: {message}")]
    Unavailable { message: String },

    #[error("Invalid product query: {message}")]
    InvalidQuery { message: String },
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        SourceError::Unavailable {
            message: message.into(),
        }
    }
}
