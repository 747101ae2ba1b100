//! Entity metadata for the Victoria document mapper.
//!
//! Every persisted type registers itself through [`Entity::describe`],
//! declaring its name, time-to-live, logical type tag and fields. The
//! [`EntityMetaFactory`] turns that declaration into an immutable
//! [`EntityMeta`]; the [`EntityMetaContainer`] caches one meta per type so
//! derivation happens once per process.
//!
//! # Rules
//!
//! 1. At most one field per type carries the identity marker. Declaring
//!    more is rejected, never resolved by picking one.
//! 2. A TTL of `0` means the document never expires.
//! 3. Storage keys are `id_prefix + id`.
//! 4. Cache entries are keyed by exact type and never evicted.
//!
//! # Modules
//!
//! - [`descriptor`]: the [`Entity`] trait and its builders
//! - [`meta`]: derived [`EntityMeta`]
//! - [`factory`]: [`EntityMetaFactory`]
//! - [`container`]: the [`EntityMetaContainer`] cache
//! - [`error`]: [`MetaError`]

pub mod container;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod meta;

pub use container::EntityMetaContainer;
pub use descriptor::{Entity, EntityDescriptor, FieldDescriptor, FieldReader, IdentityMarker};
pub use error::{MetaError, MetaResult};
pub use factory::EntityMetaFactory;
pub use meta::{EntityMeta, IdField};
