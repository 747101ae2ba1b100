use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::descriptor::Entity;
use crate::error::{MetaError, MetaResult};
use crate::meta::{EntityMeta, IdField};

/// Derives [`EntityMeta`] from an entity's descriptor.
///
/// Pure apart from the computation counter, which exists so callers can
/// observe how often derivation actually ran.
#[derive(Debug, Default)]
pub struct EntityMetaFactory {
    computations: AtomicU64,
}

impl EntityMetaFactory {
    /// Create a factory with a zeroed computation counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of metas this factory has derived so far.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::SeqCst)
    }

    /// Scan `T`'s descriptor once and build its meta.
    ///
    /// Rejects descriptors with an empty entity name, empty or duplicate
    /// field names, or more than one identity field.
    pub fn create_entity_meta<T: Entity>(&self) -> MetaResult<EntityMeta<T>> {
        self.computations.fetch_add(1, Ordering::SeqCst);

        let descriptor = T::describe();
        let entity = descriptor.name;
        if entity.is_empty() {
            return Err(MetaError::EmptyEntityName);
        }

        let mut seen = HashSet::with_capacity(descriptor.fields.len());
        let mut identities = Vec::new();
        for field in &descriptor.fields {
            if field.name.is_empty() {
                return Err(MetaError::EmptyFieldName { entity });
            }
            if !seen.insert(field.name) {
                return Err(MetaError::DuplicateField {
                    entity,
                    field: field.name,
                });
            }
            if let Some(marker) = &field.identity {
                identities.push((field, marker));
            }
        }

        if identities.len() > 1 {
            return Err(MetaError::MultipleIdentityFields {
                entity,
                fields: identities.iter().map(|(f, _)| f.name).collect(),
            });
        }

        let (id_field, id_prefix) = match identities.first() {
            Some((field, marker)) => (
                Some(IdField::new(field.name, field.reader)),
                marker.prefix.clone(),
            ),
            None => (None, String::new()),
        };

        let meta = EntityMeta {
            entity_name: entity,
            ttl_seconds: descriptor.ttl.unwrap_or(0),
            id_field,
            id_prefix,
            entity_type: descriptor.entity_type.unwrap_or_default(),
        };
        debug!(entity, ttl = meta.ttl_seconds, prefix = %meta.id_prefix, "entity meta derived");
        Ok(meta)
    }
}
