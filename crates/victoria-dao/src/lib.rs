//! Typed data-access objects over a document store.
//!
//! A [`Dao`] is the single point of interaction between application code
//! and the store for one entity type. It resolves each element's id, TTL
//! and key prefix from the cached [`EntityMeta`](victoria_meta::EntityMeta),
//! encodes elements with a [`DocumentCodec`], writes them through a
//! [`DocumentStore`](victoria_store::DocumentStore) and runs queries through
//! a [`QueryEngine`](victoria_store::QueryEngine).
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use serde::{Deserialize, Serialize};
//! use victoria_dao::Dao;
//! use victoria_meta::{Entity, EntityDescriptor, FieldDescriptor};
//! use victoria_store::InMemoryDocumentStore;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Session {
//!     session_id: String,
//! }
//!
//! impl Entity for Session {
//!     fn describe() -> EntityDescriptor<Self> {
//!         EntityDescriptor::new("Session")
//!             .ttl(3600)
//!             .field(FieldDescriptor::new("session_id", |s: &Session| s.session_id.clone()).identity("sess:"))
//!     }
//! }
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let dao: Dao<Session> = Dao::builder(store.clone(), store, runtime.handle().clone()).build();
//!
//! let id = dao.blocking().save_element(&Session { session_id: "abc".into() }).unwrap();
//! assert_eq!(id, "abc");
//! assert!(dao.blocking().exists_by_id("abc").unwrap());
//! ```
//!
//! # Delivery forms
//!
//! Every operation is implemented once, as an async method on [`Dao`].
//! [`Dao::blocking`] returns a [`BlockingDao`] that waits for each result;
//! [`Dao::callback`] returns a [`CallbackDao`] that hands each result,
//! success or failure, to a continuation.
//!
//! # Modules
//!
//! - [`dao`]: [`Dao`] and its builder
//! - [`blocking`] / [`callback`]: delivery views
//! - [`proxy`]: [`ListProxy`], a live list backed by one document
//! - [`watcher`]: [`LifecycleWatcher`] hooks
//! - [`codec`]: [`DocumentCodec`] and [`JsonCodec`]
//! - [`config`]: [`DaoConfig`]
//! - [`error`]: [`DaoError`]

pub mod blocking;
pub mod callback;
pub mod codec;
pub mod config;
pub mod dao;
mod dispatch;
pub mod error;
pub mod proxy;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use blocking::BlockingDao;
pub use callback::CallbackDao;
pub use codec::{DocumentCodec, JsonCodec};
pub use config::DaoConfig;
pub use dao::{Dao, DaoBuilder, WatcherFailureStream};
pub use error::{DaoError, DaoResult, WatcherError, WatcherResult};
pub use proxy::{BlockingListProxy, ListProxy};
pub use watcher::{Hook, LifecycleWatcher, NoopWatcher, TracingWatcher, WatcherFailure};
