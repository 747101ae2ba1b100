//! Static entity registration.
//!
//! Entity types describe themselves through an [`EntityDescriptor`]: the
//! registered name, an optional time-to-live, an optional logical type tag
//! and the list of persisted fields. A field may carry an
//! [`IdentityMarker`], which designates it as the source of the entity's
//! storage id.
//!
//! ```rust
//! use victoria_meta::{Entity, EntityDescriptor, FieldDescriptor};
//!
//! struct Session {
//!     session_id: String,
//!     user: String,
//! }
//!
//! impl Entity for Session {
//!     fn describe() -> EntityDescriptor<Self> {
//!         EntityDescriptor::new("Session")
//!             .ttl(3600)
//!             .entity_type("session")
//!             .field(FieldDescriptor::new("session_id", |s: &Session| s.session_id.clone()).identity("sess:"))
//!             .field(FieldDescriptor::new("user", |s: &Session| s.user.clone()))
//!     }
//! }
//! ```

use std::fmt;

/// A type whose instances are persisted as documents.
pub trait Entity: Send + Sync + 'static {
    /// Declare the entity's persistence facts.
    ///
    /// Must be deterministic: every call describes the same entity.
    fn describe() -> EntityDescriptor<Self>
    where
        Self: Sized;
}

/// Reads the string form of a field from an instance.
pub type FieldReader<T> = fn(&T) -> String;

/// Marks a field as the entity's identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityMarker {
    /// Prepended to the field value to build the storage key.
    pub prefix: String,
}

/// A declared field of an entity type.
pub struct FieldDescriptor<T> {
    pub(crate) name: &'static str,
    pub(crate) reader: FieldReader<T>,
    pub(crate) identity: Option<IdentityMarker>,
}

impl<T> FieldDescriptor<T> {
    /// Declare a field with the accessor producing its string form.
    pub fn new(name: &'static str, reader: FieldReader<T>) -> Self {
        Self {
            name,
            reader,
            identity: None,
        }
    }

    /// Mark this field as the identity field, with the given key prefix.
    pub fn identity(mut self, prefix: impl Into<String>) -> Self {
        self.identity = Some(IdentityMarker {
            prefix: prefix.into(),
        });
        self
    }

    /// The declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The identity marker, if the field carries one.
    pub fn identity_marker(&self) -> Option<&IdentityMarker> {
        self.identity.as_ref()
    }

    /// Read the field's string form off an instance.
    pub fn read(&self, instance: &T) -> String {
        (self.reader)(instance)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            reader: self.reader,
            identity: self.identity.clone(),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Declarative persistence facts of one entity type.
pub struct EntityDescriptor<T> {
    pub(crate) name: &'static str,
    pub(crate) ttl: Option<u32>,
    pub(crate) entity_type: Option<String>,
    pub(crate) fields: Vec<FieldDescriptor<T>>,
}

impl<T> EntityDescriptor<T> {
    /// Start a descriptor for the entity registered under `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ttl: None,
            entity_type: None,
            fields: Vec::new(),
        }
    }

    /// Seconds a persisted instance lives. `0` means it never expires.
    pub fn ttl(mut self, seconds: u32) -> Self {
        self.ttl = Some(seconds);
        self
    }

    /// Logical type tag used to scope queries to this entity.
    pub fn entity_type(mut self, tag: impl Into<String>) -> Self {
        self.entity_type = Some(tag.into());
        self
    }

    /// Declare a field.
    pub fn field(mut self, field: FieldDescriptor<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// The registered entity name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }
}

impl<T> fmt::Debug for EntityDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("entity_type", &self.entity_type)
            .field("fields", &self.fields)
            .finish()
    }
}
