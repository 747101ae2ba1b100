use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use tracing::info;

use crate::descriptor::Entity;
use crate::error::{MetaError, MetaResult};
use crate::factory::EntityMetaFactory;
use crate::meta::EntityMeta;

type CachedMeta = Arc<dyn Any + Send + Sync>;

/// One cache slot per entity type. The slot lock serializes the first
/// computation for that type only.
type Slot = Arc<Mutex<Option<CachedMeta>>>;

/// Per-type metadata cache backed by an [`EntityMetaFactory`].
///
/// Entries are keyed by exact `TypeId`, added on first use or preload and
/// never removed. Concurrent first use of a type runs the factory once;
/// every caller observes the same `Arc<EntityMeta<T>>`.
#[derive(Debug, Default)]
pub struct EntityMetaContainer {
    factory: EntityMetaFactory,
    slots: RwLock<HashMap<TypeId, Slot>>,
}

impl EntityMetaContainer {
    /// Create an empty container with its own factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide container.
    pub fn global() -> Arc<EntityMetaContainer> {
        static GLOBAL: OnceLock<Arc<EntityMetaContainer>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(EntityMetaContainer::new())).clone()
    }

    /// The factory backing this container.
    pub fn factory(&self) -> &EntityMetaFactory {
        &self.factory
    }

    /// Cached meta for `T`, computing it on first use.
    pub fn meta<T: Entity>(&self) -> MetaResult<Arc<EntityMeta<T>>> {
        let slot = self.slot(TypeId::of::<T>());
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let cached = match guard.as_ref() {
            Some(cached) => cached.clone(),
            None => {
                let meta: CachedMeta = Arc::new(self.factory.create_entity_meta::<T>()?);
                *guard = Some(meta.clone());
                info!(entity = std::any::type_name::<T>(), "entity meta cached");
                meta
            }
        };
        drop(guard);

        cached
            .downcast::<EntityMeta<T>>()
            .map_err(|_| MetaError::CacheTypeMismatch {
                entity: std::any::type_name::<T>(),
            })
    }

    /// TTL seconds for the instance's type.
    pub fn get_entity_ttl<T: Entity>(&self, _instance: &T) -> MetaResult<u32> {
        Ok(self.meta::<T>()?.ttl_seconds())
    }

    /// String form of the instance's identity field.
    ///
    /// Fails with [`MetaError::IdentityNotFound`] when the type declares no
    /// identity field; never falls back to an empty or generated id.
    pub fn extract_id<T: Entity>(&self, instance: &T) -> MetaResult<String> {
        self.meta::<T>()?.extract_id(instance)
    }

    /// Id prefix for `T`; empty when undeclared.
    pub fn get_id_prefix<T: Entity>(&self) -> MetaResult<String> {
        Ok(self.meta::<T>()?.id_prefix().to_string())
    }

    /// Logical type tag for `T`; empty when undeclared.
    pub fn get_entity_type<T: Entity>(&self) -> MetaResult<String> {
        Ok(self.meta::<T>()?.entity_type().to_string())
    }

    /// Compute and cache `T`'s meta ahead of first use. Idempotent.
    pub fn preload_meta<T: Entity>(&self) -> MetaResult<()> {
        self.meta::<T>().map(|_| ())
    }

    /// Whether `T` has a cached entry.
    pub fn contains<T: Entity>(&self) -> bool {
        let slot = {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            slots.get(&TypeId::of::<T>()).cloned()
        };
        slot.is_some_and(|slot| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        })
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, type_id: TypeId) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return slot.clone();
        }
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EntityDescriptor, FieldDescriptor};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    struct Session {
        session_id: String,
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
        }
    }

    struct AdminSession {
        session_id: String,
    }

    // Structurally identical to `Session`; must still get its own entry.
    impl Entity for AdminSession {
        fn describe() -> EntityDescriptor<Self> {
            EntityDescriptor::new("Session")
                .ttl(3600)
                .entity_type("session")
                .field(
                    FieldDescriptor::new("session_id", |s: &AdminSession| s.session_id.clone())
                        .identity("sess:"),
                )
        }
    }

    struct Anonymous {
        label: String,
    }

    impl Entity for Anonymous {
        fn describe() -> EntityDescriptor<Self> {
            EntityDescriptor::new("Anonymous")
                .field(FieldDescriptor::new("label", |a: &Anonymous| a.label.clone()))
        }
    }

    struct Slow;

    impl Entity for Slow {
        fn describe() -> EntityDescriptor<Self> {
            thread::sleep(Duration::from_millis(20));
            EntityDescriptor::new("Slow").ttl(5)
        }
    }

    struct Broken;

    impl Entity for Broken {
        fn describe() -> EntityDescriptor<Self> {
            EntityDescriptor::new("Broken")
                .field(FieldDescriptor::new("a", |_: &Broken| String::new()).identity(""))
                .field(FieldDescriptor::new("b", |_: &Broken| String::new()).identity(""))
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[test]
    fn ttl_is_cached_after_first_lookup() {
        let container = EntityMetaContainer::new();
        let session = Session { session_id: "abc".into() };

        assert_eq!(container.get_entity_ttl(&session).unwrap(), 3600);
        assert_eq!(container.get_entity_ttl(&session).unwrap(), 3600);
        assert_eq!(container.factory().computations(), 1);
    }

    #[test]
    fn accessors_read_cached_meta() {
        let container = EntityMetaContainer::new();
        let session = Session { session_id: "abc".into() };

        assert_eq!(container.extract_id(&session).unwrap(), "abc");
        assert_eq!(container.get_id_prefix::<Session>().unwrap(), "sess:");
        assert_eq!(container.get_entity_type::<Session>().unwrap(), "session");
        assert_eq!(container.factory().computations(), 1);
    }

    #[test]
    fn extract_id_without_identity_field_fails() {
        let container = EntityMetaContainer::new();
        let err = container
            .extract_id(&Anonymous { label: "x".into() })
            .unwrap_err();
        assert_eq!(err, MetaError::IdentityNotFound { entity: "Anonymous" });
    }

    #[test]
    fn lookups_are_keyed_by_exact_type() {
        let container = EntityMetaContainer::new();
        container.preload_meta::<Session>().unwrap();
        assert!(!container.contains::<AdminSession>());

        container.preload_meta::<AdminSession>().unwrap();
        assert_eq!(container.len(), 2);
        assert_eq!(container.factory().computations(), 2);
        assert_eq!(
            container
                .extract_id(&AdminSession { session_id: "root".into() })
                .unwrap(),
            "root"
        );
    }

    // -----------------------------------------------------------------------
    // Preload
    // -----------------------------------------------------------------------

    #[test]
    fn preload_is_idempotent() {
        let container = EntityMetaContainer::new();
        assert!(container.is_empty());

        container.preload_meta::<Session>().unwrap();
        let first = container.meta::<Session>().unwrap();
        for _ in 0..10 {
            container.preload_meta::<Session>().unwrap();
        }
        let last = container.meta::<Session>().unwrap();

        assert!(Arc::ptr_eq(&first, &last));
        assert_eq!(*first, *last);
        assert_eq!(container.factory().computations(), 1);
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn failed_derivation_is_not_cached() {
        let container = EntityMetaContainer::new();
        assert!(container.preload_meta::<Broken>().is_err());
        assert!(container.preload_meta::<Broken>().is_err());
        assert!(!container.contains::<Broken>());
        assert_eq!(container.factory().computations(), 2);
    }

    #[test]
    fn concurrent_first_use_computes_once() {
        let container = EntityMetaContainer::new();
        let barrier = Barrier::new(4);

        let metas: Vec<Arc<EntityMeta<Slow>>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        container.meta::<Slow>().unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(container.factory().computations(), 1);
        assert!(metas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(metas[0].ttl_seconds(), 5);
    }

    #[test]
    fn unrelated_types_do_not_wait_on_each_other() {
        let container = EntityMetaContainer::new();
        thread::scope(|scope| {
            let slow = scope.spawn(|| container.preload_meta::<Slow>());
            let fast = scope.spawn(|| container.preload_meta::<Session>());
            slow.join().unwrap().unwrap();
            fast.join().unwrap().unwrap();
        });
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn global_container_is_shared() {
        let a = EntityMetaContainer::global();
        let b = EntityMetaContainer::global();
        assert!(Arc::ptr_eq(&a, &b));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest::proptest! {
        #[test]
        fn extract_id_matches_field(id in "[a-zA-Z0-9_-]{0,32}") {
            let container = EntityMetaContainer::new();
            let session = Session { session_id: id.clone() };
            proptest::prop_assert_eq!(container.extract_id(&session).unwrap(), id);
        }

        #[test]
        fn repeated_preload_is_stable(n in 1usize..20) {
            let container = EntityMetaContainer::new();
            let first = container.meta::<Session>().unwrap();
            for _ in 0..n {
                container.preload_meta::<Session>().unwrap();
            }
            proptest::prop_assert_eq!(&*container.meta::<Session>().unwrap(), &*first);
            proptest::prop_assert_eq!(container.factory().computations(), 1);
        }
    }
}
