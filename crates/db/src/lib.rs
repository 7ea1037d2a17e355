//! Persistence for book records.
//!
//! The rest of the workspace talks to storage only through the [`BookStore`] trait, so
//! backends can be swapped (or faked in tests) without touching request handling.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

use std::sync::Arc;

pub use error::StoreError;
pub use memory::MemoryBookStore;
pub use model::{Book, BookPatch, NewBook};
pub use store::BookStore;

/// Open the store named by `endpoint`.
///
/// Only the `memory://` scheme is built in.
pub fn connect(endpoint: &str) -> anyhow::Result<Arc<dyn BookStore>> {
    match endpoint.split_once("://") {
        Some(("memory", _)) => {
            tracing::info!(target: "bookshelf-db", %endpoint, "using in-memory book store");
            Ok(Arc::new(MemoryBookStore::new()))
        }
        Some((scheme, _)) => anyhow::bail!("unsupported store scheme '{}'", scheme),
        None => anyhow::bail!("malformed store endpoint '{}'", endpoint),
    }
}
