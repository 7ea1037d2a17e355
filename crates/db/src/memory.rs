//! In-memory storage backend for development and tests

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{Book, BookPatch, BookStore, NewBook, StoreError};

/// In-memory book store with a unique index on `isbn`
#[derive(Clone, Default)]
pub struct MemoryBookStore {
    data: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    /// Primary storage keyed by insertion sequence
    records: BTreeMap<u64, Book>,

    /// Unique index: isbn -> sequence
    isbn_index: HashMap<String, u64>,

    next_seq: u64,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub async fn len(&self) -> usize {
        self.data.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let state = self.data.read().await;
        Ok(state.records.values().cloned().collect())
    }

    async fn find_one(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        let state = self.data.read().await;
        Ok(state
            .isbn_index
            .get(isbn)
            .and_then(|seq| state.records.get(seq))
            .cloned())
    }

    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut state = self.data.write().await;

        if state.isbn_index.contains_key(&book.isbn) {
            return Err(StoreError::Duplicate { isbn: book.isbn });
        }

        let now = OffsetDateTime::now_utc();
        let record = Book {
            id: Uuid::now_v7(),
            isbn: book.isbn,
            title: book.title,
            description: book.description,
            publish_year: book.publish_year,
            created_at: now,
            updated_at: now,
            revision: 0,
        };

        let seq = state.next_seq;
        state.next_seq += 1;
        state.isbn_index.insert(record.isbn.clone(), seq);
        state.records.insert(seq, record.clone());

        Ok(record)
    }

    async fn find_and_update(
        &self,
        isbn: &str,
        patch: BookPatch,
    ) -> Result<Option<Book>, StoreError> {
        let mut state = self.data.write().await;

        let Some(seq) = state.isbn_index.get(isbn).copied() else {
            return Ok(None);
        };

        if let Some(new_isbn) = patch.isbn.as_deref() {
            if new_isbn != isbn && state.isbn_index.contains_key(new_isbn) {
                return Err(StoreError::Duplicate {
                    isbn: new_isbn.to_string(),
                });
            }
        }

        let Some(record) = state.records.get_mut(&seq) else {
            return Err(StoreError::unavailable(format!(
                "index entry for '{isbn}' has no record"
            )));
        };

        if patch.apply(record) {
            record.updated_at = OffsetDateTime::now_utc();
            record.revision += 1;
        }
        let updated = record.clone();

        if updated.isbn != isbn {
            state.isbn_index.remove(isbn);
            state.isbn_index.insert(updated.isbn.clone(), seq);
        }

        Ok(Some(updated))
    }

    async fn find_and_delete(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        let mut state = self.data.write().await;

        let Some(seq) = state.isbn_index.remove(isbn) else {
            return Ok(None);
        };

        Ok(state.records.remove(&seq))
    }
}
