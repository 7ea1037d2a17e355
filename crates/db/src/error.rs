use thiserror::Error;

/// Errors returned by [`crate::BookStore`] implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The unique `isbn` index rejected the write.
    #[error("duplicate isbn: {isbn}")]
    Duplicate { isbn: String },

    /// The backend could not serve the request (connectivity, timeout, corruption).
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
