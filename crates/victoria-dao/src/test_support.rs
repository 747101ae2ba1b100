//! Entities, stores and watchers shared by the crate's tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use victoria_meta::{Entity, EntityDescriptor, EntityMetaContainer, FieldDescriptor};
use victoria_store::{
    Document, DocumentStore, InMemoryDocumentStore, Query, QueryEngine, StoreError, StoreResult,
};

use crate::codec::DocumentCodec;
use crate::dao::Dao;
use crate::error::{DaoError, DaoResult, WatcherError, WatcherResult};
use crate::watcher::LifecycleWatcher;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user: String,
}

impl Session {
    pub fn new(id: &str, user: &str) -> Self {
        Self {
            session_id: id.into(),
            user: user.into(),
        }
    }
}

impl Entity for Session {
    fn describe() -> EntityDescriptor<Self> {
        EntityDescriptor::new("Session")
            .ttl(3600)
            .entity_type("session")
            .field(
                FieldDescriptor::new("session_id", |s: &Session| s.session_id.clone())
                    .identity("sess:"),
            )
            .field(FieldDescriptor::new("user", |s: &Session| s.user.clone()))
    }
}

/// No TTL, no prefix, no logical type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    pub text: String,
}

impl Entity for Note {
    fn describe() -> EntityDescriptor<Self> {
        EntityDescriptor::new("Note")
            .field(FieldDescriptor::new("id", |n: &Note| n.id.to_string()).identity(""))
            .field(FieldDescriptor::new("text", |n: &Note| n.text.clone()))
    }
}

/// Declares no identity field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anonymous {
    pub label: String,
}

impl Entity for Anonymous {
    fn describe() -> EntityDescriptor<Self> {
        EntityDescriptor::new("Anonymous")
            .field(FieldDescriptor::new("label", |a: &Anonymous| a.label.clone()))
    }
}

/// Declares two identity fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ambiguous {
    pub a: String,
    pub b: String,
}

impl Entity for Ambiguous {
    fn describe() -> EntityDescriptor<Self> {
        EntityDescriptor::new("Ambiguous")
            .field(FieldDescriptor::new("a", |x: &Ambiguous| x.a.clone()).identity(""))
            .field(FieldDescriptor::new("b", |x: &Ambiguous| x.b.clone()).identity(""))
    }
}

pub struct Fixture<E: Entity> {
    pub store: Arc<InMemoryDocumentStore>,
    pub metas: Arc<EntityMetaContainer>,
    pub dao: Dao<E>,
}

/// A JSON-coded DAO over a fresh in-memory store and metadata cache.
pub fn fixture<E>(handle: Handle) -> Fixture<E>
where
    E: Entity + Serialize + serde::de::DeserializeOwned,
{
    let store = Arc::new(InMemoryDocumentStore::new());
    fixture_on(store, handle)
}

pub fn fixture_on<E>(store: Arc<InMemoryDocumentStore>, handle: Handle) -> Fixture<E>
where
    E: Entity + Serialize + serde::de::DeserializeOwned,
{
    let metas = Arc::new(EntityMetaContainer::new());
    let dao = Dao::builder(store.clone(), store.clone(), handle)
        .meta_container(metas.clone())
        .build();
    Fixture { store, metas, dao }
}

/// A store whose every call fails.
pub struct UnavailableStore;

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn put(&self, _key: &str, _document: Document, _ttl_seconds: u32) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get(&self, _key: &str) -> StoreResult<Option<Document>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> StoreResult<bool> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn exists(&self, _key: &str) -> StoreResult<bool> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl QueryEngine for UnavailableStore {
    async fn execute(&self, _query: &Query) -> StoreResult<Vec<Document>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// A codec that refuses to encode anything.
pub struct RejectingCodec;

impl<E> DocumentCodec<E> for RejectingCodec {
    fn encode(&self, _element: &E) -> DaoResult<Value> {
        Err(DaoError::Serialization("unsupported element".into()))
    }

    fn decode(&self, _content: Value) -> DaoResult<E> {
        Err(DaoError::Serialization("unsupported document".into()))
    }
}

/// Records every hook call as `"<hook>:<id>"`; optionally fails them all.
#[derive(Default)]
pub struct RecordingWatcher {
    pub calls: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingWatcher {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, entry: String) -> WatcherResult {
        self.calls.lock().unwrap().push(entry);
        if self.fail {
            Err(WatcherError::new("watcher exploded"))
        } else {
            Ok(())
        }
    }
}

impl LifecycleWatcher<Session> for RecordingWatcher {
    fn before_save(&self, _element: &Session, id: &str) -> WatcherResult {
        self.record(format!("before_save:{id}"))
    }

    fn after_save(&self, _element: &Session, id: &str) -> WatcherResult {
        self.record(format!("after_save:{id}"))
    }

    fn before_remove(&self, id: &str) -> WatcherResult {
        self.record(format!("before_remove:{id}"))
    }

    fn after_remove(&self, id: &str) -> WatcherResult {
        self.record(format!("after_remove:{id}"))
    }

    fn after_load(&self, element: &Session) -> WatcherResult {
        self.record(format!("after_load:{}", element.session_id))
    }
}

/// Panics in every hook.
pub struct PanickingWatcher;

impl LifecycleWatcher<Session> for PanickingWatcher {
    fn before_save(&self, _element: &Session, id: &str) -> WatcherResult {
        panic!("before_save blew up for {id}")
    }

    fn after_save(&self, _element: &Session, _id: &str) -> WatcherResult {
        panic!("after_save blew up")
    }

    fn before_remove(&self, _id: &str) -> WatcherResult {
        panic!("before_remove blew up")
    }

    fn after_remove(&self, _id: &str) -> WatcherResult {
        panic!("after_remove blew up")
    }

    fn after_load(&self, _element: &Session) -> WatcherResult {
        panic!("after_load blew up")
    }
}
