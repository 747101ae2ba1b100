use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use victoria_meta::{Entity, EntityMeta, EntityMetaContainer};
use victoria_store::{Document, DocumentStore, Query, QueryEngine};

use crate::blocking::BlockingDao;
use crate::callback::CallbackDao;
use crate::codec::{DocumentCodec, JsonCodec};
use crate::config::DaoConfig;
use crate::dispatch::Dispatcher;
use crate::error::{DaoResult, WatcherError, WatcherResult};
use crate::proxy::ListProxy;
use crate::watcher::{Hook, LifecycleWatcher, NoopWatcher, WatcherFailure};

/// Receives lifecycle watcher failures published by a [`Dao`].
pub type WatcherFailureStream = broadcast::Receiver<WatcherFailure>;

struct DaoInner<E> {
    store: Arc<dyn DocumentStore>,
    queries: Arc<dyn QueryEngine>,
    codec: Arc<dyn DocumentCodec<E>>,
    metas: Arc<EntityMetaContainer>,
    watcher: RwLock<Arc<dyn LifecycleWatcher<E>>>,
    failures: broadcast::Sender<WatcherFailure>,
    config: DaoConfig,
    dispatcher: Dispatcher,
}

/// Data-access object for one entity type.
///
/// Resolves ids, TTLs and key prefixes through the [`EntityMetaContainer`]
/// and delegates document I/O to a [`DocumentStore`] and a
/// [`QueryEngine`]. Storage keys are always `id_prefix + id`, for writes
/// and reads alike.
///
/// The async methods here are the only implementation of each operation.
/// [`blocking`](Self::blocking) and [`callback`](Self::callback) return
/// views that drive the same futures to completion or hand their results
/// to a continuation.
///
/// Cloning is cheap; clones share the store, the watcher and the failure
/// channel.
pub struct Dao<E> {
    inner: Arc<DaoInner<E>>,
}

impl<E> Clone for Dao<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> Dao<E> {
    /// Start building a DAO that encodes elements as JSON.
    pub fn builder(
        store: Arc<dyn DocumentStore>,
        queries: Arc<dyn QueryEngine>,
        runtime: Handle,
    ) -> DaoBuilder<E>
    where
        E: Serialize + DeserializeOwned,
    {
        DaoBuilder::new(store, queries, Arc::new(JsonCodec), runtime)
    }

    /// Start building a DAO with a custom codec.
    pub fn builder_with_codec(
        store: Arc<dyn DocumentStore>,
        queries: Arc<dyn QueryEngine>,
        codec: Arc<dyn DocumentCodec<E>>,
        runtime: Handle,
    ) -> DaoBuilder<E> {
        DaoBuilder::new(store, queries, codec, runtime)
    }

    /// Cached metadata for `E`.
    pub fn meta(&self) -> DaoResult<Arc<EntityMeta<E>>> {
        Ok(self.inner.metas.meta::<E>()?)
    }

    pub fn config(&self) -> &DaoConfig {
        &self.inner.config
    }

    // ---- Persistence ----

    /// Upsert the element under `id_prefix + id` with the entity's TTL.
    ///
    /// Returns the element's id (without prefix).
    pub async fn save_element(&self, element: &E) -> DaoResult<String> {
        let ttl = self.inner.metas.get_entity_ttl(element)?;
        self.write_element(element, ttl).await
    }

    /// Upsert the element with an explicit TTL, overriding the declared one.
    pub async fn save_element_with_ttl(&self, element: &E, ttl_seconds: u32) -> DaoResult<String> {
        self.write_element(element, ttl_seconds).await
    }

    async fn write_element(&self, element: &E, ttl_seconds: u32) -> DaoResult<String> {
        let meta = self.meta()?;
        let id = self.inner.metas.extract_id(element)?;
        // Encode first so a codec failure never leaves a partial write.
        let content = self.inner.codec.encode(element)?;
        let key = meta.storage_key(&id);
        let watcher = self.lifecycle_watcher();

        let entity = meta.entity_name();
        self.watch(entity, Hook::BeforeSave, Some(&id), || watcher.before_save(element, &id));
        self.inner
            .store
            .put(&key, Document::tagged(content, meta.partition()), ttl_seconds)
            .await?;
        debug!(entity = meta.entity_name(), key = %key, ttl_seconds, "element saved");
        self.watch(entity, Hook::AfterSave, Some(&id), || watcher.after_save(element, &id));

        Ok(id)
    }

    /// Load the element stored for `id`. `None` if nothing is stored there.
    pub async fn get_element(&self, id: &str) -> DaoResult<Option<E>> {
        let meta = self.meta()?;
        let key = meta.storage_key(id);
        let Some(document) = self.inner.store.get(&key).await? else {
            debug!(entity = meta.entity_name(), key = %key, "element not found");
            return Ok(None);
        };
        let element = self.inner.codec.decode(document.content)?;
        self.loaded(meta.entity_name(), &element);
        Ok(Some(element))
    }

    /// First element matching the query, if any.
    pub async fn get_element_by_query(&self, query: &Query) -> DaoResult<Option<E>> {
        let entity = self.meta()?.entity_name();
        let Some(document) = self.inner.queries.execute(query).await?.into_iter().next() else {
            return Ok(None);
        };
        let element = self.inner.codec.decode(document.content)?;
        self.loaded(entity, &element);
        Ok(Some(element))
    }

    /// Every element matching the query, in the engine's order.
    pub async fn get_elements(&self, query: &Query) -> DaoResult<Vec<E>> {
        let entity = self.meta()?.entity_name();
        let documents = self.inner.queries.execute(query).await?;
        let elements = documents
            .into_iter()
            .map(|d| self.inner.codec.decode(d.content))
            .collect::<DaoResult<Vec<E>>>()?;
        for element in &elements {
            self.loaded(entity, element);
        }
        Ok(elements)
    }

    /// Every stored element of this type.
    ///
    /// Scoped by the entity's partition tag: its logical type when declared,
    /// its registered name otherwise.
    pub async fn get_all_elements(&self) -> DaoResult<Vec<E>> {
        let query = self.partition_query()?;
        self.get_elements(&query).await
    }

    /// Number of stored elements, scoped like [`get_all_elements`](Self::get_all_elements).
    pub async fn count(&self) -> DaoResult<usize> {
        let query = self.partition_query()?;
        Ok(self.inner.queries.count(&query).await?)
    }

    /// Delete the document for `id`. Returns whether one existed.
    ///
    /// Removing a missing id is not an error.
    pub async fn remove_by_id(&self, id: &str) -> DaoResult<bool> {
        let meta = self.meta()?;
        let key = meta.storage_key(id);
        let watcher = self.lifecycle_watcher();

        let entity = meta.entity_name();
        self.watch(entity, Hook::BeforeRemove, Some(id), || watcher.before_remove(id));
        let existed = self.inner.store.delete(&key).await?;
        debug!(entity = meta.entity_name(), key = %key, existed, "element removed");
        self.watch(entity, Hook::AfterRemove, Some(id), || watcher.after_remove(id));

        Ok(existed)
    }

    /// Delete the document stored for this element's id.
    pub async fn remove_element(&self, element: &E) -> DaoResult<bool> {
        let id = self.inner.metas.extract_id(element)?;
        self.remove_by_id(&id).await
    }

    /// Whether a document is stored for `id`.
    pub async fn exists_by_id(&self, id: &str) -> DaoResult<bool> {
        let key = self.meta()?.storage_key(id);
        Ok(self.inner.store.exists(&key).await?)
    }

    /// Whether a document is stored for this element's id.
    pub async fn exists_element(&self, element: &E) -> DaoResult<bool> {
        let id = self.inner.metas.extract_id(element)?;
        self.exists_by_id(&id).await
    }

    /// A live list view over the document named `document_name`.
    pub fn list_proxy(&self, document_name: impl Into<String>) -> ListProxy<E> {
        ListProxy::new(
            document_name.into(),
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.codec),
            self.inner.config.list_document_ttl,
            self.inner.dispatcher.clone(),
        )
    }

    // ---- Delivery forms ----

    /// Blocking view: each call waits for the store to respond.
    pub fn blocking(&self) -> BlockingDao<'_, E> {
        BlockingDao::new(self)
    }

    /// Callback view: each call returns immediately and delivers its result
    /// to a continuation.
    pub fn callback(&self) -> CallbackDao<E> {
        CallbackDao::new(self.clone())
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    // ---- Lifecycle ----

    /// The active watcher.
    pub fn lifecycle_watcher(&self) -> Arc<dyn LifecycleWatcher<E>> {
        self.inner
            .watcher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active watcher. Operations already running keep the
    /// watcher they started with.
    pub fn set_lifecycle_watcher(&self, watcher: Arc<dyn LifecycleWatcher<E>>) {
        *self
            .inner
            .watcher
            .write()
            .unwrap_or_else(PoisonError::into_inner) = watcher;
    }

    /// Subscribe to watcher failures published from now on.
    pub fn subscribe_watcher_failures(&self) -> WatcherFailureStream {
        self.inner.failures.subscribe()
    }

    fn partition_query(&self) -> DaoResult<Query> {
        Ok(Query::partition(self.meta()?.partition()))
    }

    fn loaded(&self, entity: &'static str, element: &E) {
        let watcher = self.lifecycle_watcher();
        self.watch(entity, Hook::AfterLoad, None, || watcher.after_load(element));
    }

    /// Run one watcher hook. Errors and panics alike are logged and
    /// published; neither reaches the caller.
    fn watch<F>(&self, entity: &'static str, hook: Hook, id: Option<&str>, call: F)
    where
        F: FnOnce() -> WatcherResult,
    {
        let err = match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err,
            Err(payload) => WatcherError::new(format!(
                "watcher panicked: {}",
                panic_message(payload.as_ref())
            )),
        };
        warn!(entity, %hook, id, error = %err, "lifecycle watcher failed");
        // No subscribers is fine; the failure has been logged.
        let _ = self.inner.failures.send(WatcherFailure {
            entity,
            hook,
            id: id.map(str::to_string),
            message: err.to_string(),
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl<E> fmt::Debug for Dao<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dao")
            .field("entity", &std::any::type_name::<E>())
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Builder for a [`Dao`].
pub struct DaoBuilder<E> {
    store: Arc<dyn DocumentStore>,
    queries: Arc<dyn QueryEngine>,
    codec: Arc<dyn DocumentCodec<E>>,
    metas: Arc<EntityMetaContainer>,
    watcher: Arc<dyn LifecycleWatcher<E>>,
    config: DaoConfig,
    runtime: Handle,
}

impl<E: Entity> DaoBuilder<E> {
    fn new(
        store: Arc<dyn DocumentStore>,
        queries: Arc<dyn QueryEngine>,
        codec: Arc<dyn DocumentCodec<E>>,
        runtime: Handle,
    ) -> Self {
        Self {
            store,
            queries,
            codec,
            metas: EntityMetaContainer::global(),
            watcher: Arc::new(NoopWatcher),
            config: DaoConfig::default(),
            runtime,
        }
    }

    /// Use a metadata cache other than the process-wide one.
    pub fn meta_container(mut self, metas: Arc<EntityMetaContainer>) -> Self {
        self.metas = metas;
        self
    }

    pub fn lifecycle_watcher(mut self, watcher: Arc<dyn LifecycleWatcher<E>>) -> Self {
        self.watcher = watcher;
        self
    }

    pub fn codec(mut self, codec: Arc<dyn DocumentCodec<E>>) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(mut self, config: DaoConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Dao<E> {
        let (failures, _) = broadcast::channel(self.config.watcher_failure_capacity.max(1));
        Dao {
            inner: Arc::new(DaoInner {
                store: self.store,
                queries: self.queries,
                codec: self.codec,
                metas: self.metas,
                watcher: RwLock::new(self.watcher),
                failures,
                config: self.config,
                dispatcher: Dispatcher::new(self.runtime),
            }),
        }
    }
}
