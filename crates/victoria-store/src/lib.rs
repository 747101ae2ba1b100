//! Document storage interfaces for the Victoria document mapper.
//!
//! The mapper never talks to a store directly. It consumes two traits:
//!
//! - [`DocumentStore`] -- keyed `put`/`get`/`delete`/`exists` with per-document TTL
//! - [`QueryEngine`] -- runs an opaque [`Query`] and returns raw [`Document`]s
//!
//! # Storage Backends
//!
//! - [`InMemoryDocumentStore`] -- `BTreeMap`-based store implementing both
//!   traits, for tests and embedding
//!
//! # Design Rules
//!
//! 1. Writes are upserts; the last write to a key wins.
//! 2. A TTL of `0` means no expiry. Expired documents read as absent.
//! 3. The store never interprets document content beyond query predicates.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod document;
pub mod error;
pub mod memory;
pub mod query;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use document::Document;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDocumentStore;
pub use query::{Filter, Query};
pub use traits::{DocumentStore, QueryEngine};
