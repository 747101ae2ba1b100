use std::fmt;

use crate::descriptor::FieldReader;
use crate::error::{MetaError, MetaResult};

/// The identity field of an entity type.
pub struct IdField<T> {
    name: &'static str,
    reader: FieldReader<T>,
}

impl<T> IdField<T> {
    pub(crate) fn new(name: &'static str, reader: FieldReader<T>) -> Self {
        Self { name, reader }
    }

    /// The declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the identity value off an instance.
    pub fn read(&self, instance: &T) -> String {
        (self.reader)(instance)
    }
}

impl<T> Clone for IdField<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            reader: self.reader,
        }
    }
}

impl<T> fmt::Debug for IdField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdField").field(&self.name).finish()
    }
}

/// Derived persistence facts about one entity type.
///
/// Immutable once built. Two metas for the same type compare equal when
/// every derived fact matches, which is what recomputation must guarantee.
pub struct EntityMeta<T> {
    pub(crate) entity_name: &'static str,
    pub(crate) ttl_seconds: u32,
    pub(crate) id_field: Option<IdField<T>>,
    pub(crate) id_prefix: String,
    pub(crate) entity_type: String,
}

impl<T> EntityMeta<T> {
    /// Registered name of the entity type.
    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    /// Seconds a persisted instance lives; `0` means no expiry.
    pub fn ttl_seconds(&self) -> u32 {
        self.ttl_seconds
    }

    /// The identity field, if the type declares one.
    pub fn id_field(&self) -> Option<&IdField<T>> {
        self.id_field.as_ref()
    }

    /// Prefix prepended to ids to form storage keys.
    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    /// Logical type tag; empty when undeclared.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The tag that scopes this type's documents: the logical type when
    /// declared, otherwise the registered entity name.
    pub fn partition(&self) -> &str {
        if self.entity_type.is_empty() {
            self.entity_name
        } else {
            &self.entity_type
        }
    }

    /// String form of the instance's identity field.
    pub fn extract_id(&self, instance: &T) -> MetaResult<String> {
        self.id_field
            .as_ref()
            .map(|field| field.read(instance))
            .ok_or(MetaError::IdentityNotFound {
                entity: self.entity_name,
            })
    }

    /// Storage key for an id: `id_prefix + id`.
    pub fn storage_key(&self, id: &str) -> String {
        format!("{}{}", self.id_prefix, id)
    }
}

impl<T> PartialEq for EntityMeta<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity_name == other.entity_name
            && self.ttl_seconds == other.ttl_seconds
            && self.id_field.as_ref().map(IdField::name) == other.id_field.as_ref().map(IdField::name)
            && self.id_prefix == other.id_prefix
            && self.entity_type == other.entity_type
    }
}

impl<T> Eq for EntityMeta<T> {}

impl<T> fmt::Debug for EntityMeta<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMeta")
            .field("entity_name", &self.entity_name)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("id_field", &self.id_field)
            .field("id_prefix", &self.id_prefix)
            .field("entity_type", &self.entity_type)
            .finish()
    }
}
