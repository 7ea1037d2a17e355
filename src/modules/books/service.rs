//! Translates validated book requests into store calls and store results into outcomes.

use std::sync::Arc;

use bookshelf_db::{Book, BookPatch, BookStore, NewBook};

use super::error::BookError;

/// Book operations over an explicitly supplied store.
///
/// Holds no records of its own; every call goes to the store.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        let books = self
            .store
            .find_all()
            .await
            .map_err(|err| store_failure("list", None, err))?;
        tracing::debug!(count = books.len(), "listed books");
        Ok(books)
    }

    /// A missing record is `Ok(None)`, not [`BookError::NotFound`].
    pub async fn get(&self, isbn: &str) -> Result<Option<Book>, BookError> {
        let book = self
            .store
            .find_one(isbn)
            .await
            .map_err(|err| store_failure("get", Some(isbn), err))?;
        tracing::debug!(%isbn, found = book.is_some(), "looked up book");
        Ok(book)
    }

    /// Insert a record unless one with the same isbn exists.
    ///
    /// The existence check and the insert are separate store calls; a concurrent
    /// create can slip between them, in which case the store's duplicate rejection
    /// surfaces as the same conflict.
    pub async fn create(&self, input: NewBook) -> Result<Book, BookError> {
        let isbn = input.isbn.clone();

        let existing = self
            .store
            .find_one(&isbn)
            .await
            .map_err(|err| store_failure("create", Some(&isbn), err))?;
        if existing.is_some() {
            tracing::debug!(%isbn, outcome = "conflict", "create rejected");
            return Err(BookError::Conflict { isbn });
        }

        let book = self
            .store
            .insert(input)
            .await
            .map_err(|err| store_failure("create", Some(&isbn), err))?;
        tracing::debug!(%isbn, outcome = "created", "book created");
        Ok(book)
    }

    /// Merge `patch` into the record with `isbn`.
    pub async fn update(&self, isbn: &str, patch: BookPatch) -> Result<(), BookError> {
        let updated = self
            .store
            .find_and_update(isbn, patch)
            .await
            .map_err(|err| store_failure("update", Some(isbn), err))?;

        match updated {
            Some(_) => {
                tracing::debug!(%isbn, outcome = "updated", "book updated");
                Ok(())
            }
            None => {
                tracing::debug!(%isbn, outcome = "not_found", "update rejected");
                Err(BookError::NotFound {
                    isbn: isbn.to_string(),
                })
            }
        }
    }

    pub async fn delete(&self, isbn: &str) -> Result<(), BookError> {
        let deleted = self
            .store
            .find_and_delete(isbn)
            .await
            .map_err(|err| store_failure("delete", Some(isbn), err))?;

        match deleted {
            Some(_) => {
                tracing::debug!(%isbn, outcome = "deleted", "book deleted");
                Ok(())
            }
            None => {
                tracing::debug!(%isbn, outcome = "not_found", "delete rejected");
                Err(BookError::NotFound {
                    isbn: isbn.to_string(),
                })
            }
        }
    }
}

fn store_failure(operation: &str, isbn: Option<&str>, err: bookshelf_db::StoreError) -> BookError {
    let classified = BookError::from(err);
    match &classified {
        BookError::Store(cause) => {
            tracing::error!(operation, isbn = ?isbn, error = %cause, "store call failed");
        }
        _ => {
            tracing::debug!(
                operation,
                isbn = ?isbn,
                outcome = "conflict",
                "store rejected duplicate"
            );
        }
    }
    classified
}
