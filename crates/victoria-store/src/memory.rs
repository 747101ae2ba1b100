use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::trace;

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::query::Query;
use crate::traits::{DocumentStore, QueryEngine};

#[derive(Clone, Debug)]
struct Entry {
    document: Document,
    ttl_seconds: u32,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

/// In-memory document store and query engine.
///
/// Intended for tests and embedding. Documents are held in a `BTreeMap`
/// behind a `RwLock`, so query results come back ordered by key. Expired
/// documents are hidden from reads immediately and removed on the next
/// write or an explicit [`purge_expired`](Self::purge_expired).
pub struct InMemoryDocumentStore {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of live documents.
    pub fn len(&self) -> StoreResult<usize> {
        let now = Instant::now();
        Ok(self.read()?.values().filter(|e| e.is_live(now)).count())
    }

    /// Returns `true` if no live document is stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// TTL the live document at `key` was written with.
    pub fn ttl_of(&self, key: &str) -> StoreResult<Option<u32>> {
        let now = Instant::now();
        Ok(self
            .read()?
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.ttl_seconds))
    }

    /// Sorted keys of all live documents.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let now = Instant::now();
        Ok(self
            .read()?
            .iter()
            .filter(|(_, e)| e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect())
    }

    /// Drop every expired document. Returns how many were removed.
    pub fn purge_expired(&self) -> StoreResult<usize> {
        let mut entries = self.write()?;
        Ok(Self::purge(&mut entries, Instant::now()))
    }

    /// Remove all documents.
    pub fn clear(&self) -> StoreResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn purge(entries: &mut BTreeMap<String, Entry>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn put(&self, key: &str, document: Document, ttl_seconds: u32) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let now = Instant::now();
        let expires_at =
            (ttl_seconds > 0).then(|| now + Duration::from_secs(u64::from(ttl_seconds)));

        let mut entries = self.write()?;
        Self::purge(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                document,
                ttl_seconds,
                expires_at,
            },
        );
        trace!(key, ttl_seconds, "document stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Document>> {
        let now = Instant::now();
        Ok(self
            .read()?
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.document.clone()))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let now = Instant::now();
        let removed = self.write()?.remove(key);
        Ok(removed.is_some_and(|e| e.is_live(now)))
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let now = Instant::now();
        Ok(self.read()?.get(key).is_some_and(|e| e.is_live(now)))
    }
}

#[async_trait]
impl QueryEngine for InMemoryDocumentStore {
    async fn execute(&self, query: &Query) -> StoreResult<Vec<Document>> {
        let now = Instant::now();
        let entries = self.read()?;
        let matching = entries
            .values()
            .filter(|e| e.is_live(now) && query.matches(&e.document))
            .map(|e| e.document.clone());
        Ok(match query.max_results() {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn count(&self, query: &Query) -> StoreResult<usize> {
        let now = Instant::now();
        let entries = self.read()?;
        let matching = entries
            .values()
            .filter(|e| e.is_live(now) && query.matches(&e.document))
            .count();
        Ok(query.max_results().map_or(matching, |limit| matching.min(limit)))
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or_default();
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &count)
            .finish()
    }
}
