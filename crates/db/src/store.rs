use async_trait::async_trait;

use crate::{Book, BookPatch, NewBook, StoreError};

/// Storage capability for book records, keyed by `isbn`.
///
/// Implementations own uniqueness of `isbn`: a write that would create a second live
/// record with the same `isbn` must fail with [`StoreError::Duplicate`], whatever checks
/// the caller performed beforehand.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All live records in insertion order.
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;

    async fn find_one(&self, isbn: &str) -> Result<Option<Book>, StoreError>;

    /// Insert a new record, stamping its id and timestamps.
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Apply `patch` to the record with `isbn`. `Ok(None)` when no record matches.
    async fn find_and_update(
        &self,
        isbn: &str,
        patch: BookPatch,
    ) -> Result<Option<Book>, StoreError>;

    /// Remove the record with `isbn`, returning it. `Ok(None)` when no record matches.
    async fn find_and_delete(&self, isbn: &str) -> Result<Option<Book>, StoreError>;
}
