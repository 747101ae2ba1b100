use async_trait::async_trait;

use crate::document::Document;
use crate::error::StoreResult;
use crate::query::Query;

/// Key/value document store client.
///
/// All implementations must satisfy these invariants:
/// - `put` is an upsert: it replaces any document already at the key.
/// - A TTL of `0` means the document never expires.
/// - Expired documents are indistinguishable from absent ones.
/// - All I/O errors are propagated, never silently ignored. Retry policy,
///   if any, belongs to the implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a document at `key`, replacing any existing one.
    async fn put(&self, key: &str, document: Document, ttl_seconds: u32) -> StoreResult<()>;

    /// Read the document at `key`.
    ///
    /// Returns `Ok(None)` if no live document exists.
    async fn get(&self, key: &str) -> StoreResult<Option<Document>>;

    /// Delete the document at `key`. Returns `true` if one existed.
    ///
    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Check whether a live document exists at `key`.
    async fn exists(&self, key: &str) -> StoreResult<bool>;
}

/// Executes structured queries against the store's secondary index.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Run the query and return every matching document.
    ///
    /// Zero matches is `Ok(vec![])`, not an error.
    async fn execute(&self, query: &Query) -> StoreResult<Vec<Document>>;

    /// Count the documents matching the query.
    ///
    /// Default implementation runs `execute()`. Backends may override with
    /// a cheaper count.
    async fn count(&self, query: &Query) -> StoreResult<usize> {
        Ok(self.execute(query).await?.len())
    }
}
