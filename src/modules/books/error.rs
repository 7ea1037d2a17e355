use axum::response::{IntoResponse, Response};
use bookshelf_db::StoreError;
use bookshelf_http::error::AppError;
use serde_json::json;
use thiserror::Error;

use super::validation::{self, ValidationFailure};

/// Outcome of a book operation other than success.
#[derive(Debug, Error)]
pub enum BookError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("book '{isbn}' already exists")]
    Conflict { isbn: String },

    #[error("book '{isbn}' not found")]
    NotFound { isbn: String },

    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for BookError {
    /// A uniqueness violation reported by the store is a conflict, even when the
    /// caller's own existence check passed.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { isbn } => BookError::Conflict { isbn },
            other => BookError::Store(other),
        }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(failure) => AppError::validation(
                failure
                    .errors
                    .iter()
                    .map(|e| json!({ "field": e.field, "message": e.message }))
                    .collect(),
                "Validation failed",
            ),
            BookError::Conflict { isbn } => AppError::conflict(
                vec![json!({
                    "field": validation::ISBN,
                    "message": "Already Exists",
                    "value": isbn,
                })],
                "Book already exists",
            ),
            BookError::NotFound { .. } => AppError::not_found("Book not found"),
            BookError::Store(err) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        BookError::Validation(failure).into()
    }
}

impl IntoResponse for BookError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
