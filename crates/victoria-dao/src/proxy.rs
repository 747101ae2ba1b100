//! Live list views backed by a single document.
//!
//! A [`ListProxy`] keeps no state of its own. Every read fetches the
//! backing document and decodes it; every write fetches, changes the
//! sequence in memory and writes the whole document back. An absent
//! document reads as an empty list and is created by the first write.
//!
//! Concurrent writers to the same document are not coordinated: the last
//! full-document write wins.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use victoria_store::{Document, DocumentStore};

use crate::codec::DocumentCodec;
use crate::dispatch::Dispatcher;
use crate::error::{DaoError, DaoResult};

/// An ordered sequence of `E` stored as one JSON array document.
pub struct ListProxy<E> {
    name: String,
    store: Arc<dyn DocumentStore>,
    codec: Arc<dyn DocumentCodec<E>>,
    ttl_seconds: u32,
    dispatcher: Dispatcher,
}

impl<E> Clone for ListProxy<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            ttl_seconds: self.ttl_seconds,
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<E: Send + Sync + 'static> ListProxy<E> {
    pub(crate) fn new(
        name: String,
        store: Arc<dyn DocumentStore>,
        codec: Arc<dyn DocumentCodec<E>>,
        ttl_seconds: u32,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            name,
            store,
            codec,
            ttl_seconds,
            dispatcher,
        }
    }

    /// Name (storage key) of the backing document.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ---- Reads ----

    /// Current contents of the backing document, in stored order.
    pub async fn to_vec(&self) -> DaoResult<Vec<E>> {
        let Some(document) = self.store.get(&self.name).await? else {
            return Ok(Vec::new());
        };
        let Value::Array(items) = document.content else {
            return Err(DaoError::Serialization(format!(
                "list document {} does not hold an array",
                self.name
            )));
        };
        items
            .into_iter()
            .map(|item| self.codec.decode(item))
            .collect()
    }

    pub async fn len(&self) -> DaoResult<usize> {
        Ok(self.to_vec().await?.len())
    }

    pub async fn is_empty(&self) -> DaoResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Element at `index`, or `None` past the end.
    pub async fn get(&self, index: usize) -> DaoResult<Option<E>> {
        Ok(self.to_vec().await?.into_iter().nth(index))
    }

    pub async fn contains(&self, element: &E) -> DaoResult<bool>
    where
        E: PartialEq,
    {
        Ok(self.to_vec().await?.contains(element))
    }

    // ---- Writes ----

    /// Append one element.
    pub async fn push(&self, element: E) -> DaoResult<()> {
        let mut items = self.to_vec().await?;
        items.push(element);
        self.write(&items).await
    }

    /// Append elements in iteration order.
    pub async fn extend(&self, elements: Vec<E>) -> DaoResult<()> {
        let mut items = self.to_vec().await?;
        items.extend(elements);
        self.write(&items).await
    }

    /// Insert at `index`, shifting later elements. `index == len` appends.
    pub async fn insert(&self, index: usize, element: E) -> DaoResult<()> {
        let mut items = self.to_vec().await?;
        if index > items.len() {
            return Err(DaoError::IndexOutOfBounds {
                index,
                len: items.len(),
            });
        }
        items.insert(index, element);
        self.write(&items).await
    }

    /// Replace the element at `index`, returning the previous one.
    pub async fn set(&self, index: usize, element: E) -> DaoResult<E> {
        let mut items = self.to_vec().await?;
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(DaoError::IndexOutOfBounds { index, len })?;
        let previous = std::mem::replace(slot, element);
        self.write(&items).await?;
        Ok(previous)
    }

    /// Remove and return the element at `index`.
    pub async fn remove(&self, index: usize) -> DaoResult<E> {
        let mut items = self.to_vec().await?;
        if index >= items.len() {
            return Err(DaoError::IndexOutOfBounds {
                index,
                len: items.len(),
            });
        }
        let removed = items.remove(index);
        self.write(&items).await?;
        Ok(removed)
    }

    /// Remove the first element equal to `element`. Returns whether one was
    /// found; the document is left untouched otherwise.
    pub async fn remove_item(&self, element: &E) -> DaoResult<bool>
    where
        E: PartialEq,
    {
        let mut items = self.to_vec().await?;
        let Some(position) = items.iter().position(|item| item == element) else {
            return Ok(false);
        };
        items.remove(position);
        self.write(&items).await?;
        Ok(true)
    }

    /// Store an empty list.
    pub async fn clear(&self) -> DaoResult<()> {
        self.write(&[]).await
    }

    async fn write(&self, items: &[E]) -> DaoResult<()> {
        let encoded = items
            .iter()
            .map(|item| self.codec.encode(item))
            .collect::<DaoResult<Vec<Value>>>()?;
        self.store
            .put(
                &self.name,
                Document::new(Value::Array(encoded)),
                self.ttl_seconds,
            )
            .await?;
        debug!(list = %self.name, len = items.len(), "list document written");
        Ok(())
    }

    /// Blocking view of this proxy.
    pub fn blocking(&self) -> BlockingListProxy<'_, E> {
        BlockingListProxy { proxy: self }
    }
}

impl<E> fmt::Debug for ListProxy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListProxy")
            .field("name", &self.name)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Blocking view of a [`ListProxy`]. Same rules as
/// [`BlockingDao`](crate::BlockingDao).
#[derive(Debug)]
pub struct BlockingListProxy<'a, E> {
    proxy: &'a ListProxy<E>,
}

impl<E: Send + Sync + 'static> BlockingListProxy<'_, E> {
    pub fn to_vec(&self) -> DaoResult<Vec<E>> {
        self.proxy.dispatcher.block_on(self.proxy.to_vec())
    }

    pub fn len(&self) -> DaoResult<usize> {
        self.proxy.dispatcher.block_on(self.proxy.len())
    }

    pub fn is_empty(&self) -> DaoResult<bool> {
        self.proxy.dispatcher.block_on(self.proxy.is_empty())
    }

    pub fn get(&self, index: usize) -> DaoResult<Option<E>> {
        self.proxy.dispatcher.block_on(self.proxy.get(index))
    }

    pub fn contains(&self, element: &E) -> DaoResult<bool>
    where
        E: PartialEq,
    {
        self.proxy.dispatcher.block_on(self.proxy.contains(element))
    }

    pub fn push(&self, element: E) -> DaoResult<()> {
        self.proxy.dispatcher.block_on(self.proxy.push(element))
    }

    pub fn extend(&self, elements: Vec<E>) -> DaoResult<()> {
        self.proxy.dispatcher.block_on(self.proxy.extend(elements))
    }

    pub fn insert(&self, index: usize, element: E) -> DaoResult<()> {
        self.proxy.dispatcher.block_on(self.proxy.insert(index, element))
    }

    pub fn set(&self, index: usize, element: E) -> DaoResult<E> {
        self.proxy.dispatcher.block_on(self.proxy.set(index, element))
    }

    pub fn remove(&self, index: usize) -> DaoResult<E> {
        self.proxy.dispatcher.block_on(self.proxy.remove(index))
    }

    pub fn remove_item(&self, element: &E) -> DaoResult<bool>
    where
        E: PartialEq,
    {
        self.proxy.dispatcher.block_on(self.proxy.remove_item(element))
    }

    pub fn clear(&self) -> DaoResult<()> {
        self.proxy.dispatcher.block_on(self.proxy.clear())
    }
}
