use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier, never exposed to callers
    #[serde(skip)]
    pub id: Uuid,
    /// Unique ISBN-like identifier used to address the record
    pub isbn: String,
    pub title: String,
    pub description: String,
    pub publish_year: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Number of updates applied since insert
    #[serde(skip)]
    pub revision: u64,
}

/// Fields supplied when creating a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub description: String,
    pub publish_year: i64,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub publish_year: Option<i64>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.publish_year.is_none()
    }

    /// Merge the provided fields into `book`. Returns whether anything changed.
    pub fn apply(self, book: &mut Book) -> bool {
        let mut changed = false;
        if let Some(isbn) = self.isbn {
            changed |= book.isbn != isbn;
            book.isbn = isbn;
        }
        if let Some(title) = self.title {
            changed |= book.title != title;
            book.title = title;
        }
        if let Some(description) = self.description {
            changed |= book.description != description;
            book.description = description;
        }
        if let Some(publish_year) = self.publish_year {
            changed |= book.publish_year != publish_year;
            book.publish_year = publish_year;
        }
        changed
    }
}
