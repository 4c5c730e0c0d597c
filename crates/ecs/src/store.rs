//! Per-type component storage keyed by [`EntityId`].
//!
//! Each component type gets its own `BTreeMap` so iteration order is the
//! canonical `EntityId` order regardless of insertion history.

use simcore_common::EntityId;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};

/// Anything that can be stored as a component.
pub trait Component: Any + Send + Sync {}

impl<T: Any + Send + Sync> Component for T {}

/// Object-safe view over a [`Storage<T>`] for entity-wide operations.
trait ErasedStorage: Send + Sync {
    fn remove_entity(&mut self, entity: EntityId) -> bool;
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Storage for a single component type.
#[derive(Debug)]
pub struct Storage<T> {
    entries: BTreeMap<EntityId, T>,
}

impl<T> Default for Storage<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Storage<T> {
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.entries.get(&entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.entries.get_mut(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entries.iter().map(|(e, v)| (*e, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entries.iter_mut().map(|(e, v)| (*e, v))
    }
}

impl<T: Component> ErasedStorage for Storage<T> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.entries.remove(&entity).is_some()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Component storage for all component types.
///
/// Storages are created lazily on first insert. The store does not know
/// which entities are alive; the owning world enforces that.
#[derive(Default)]
pub struct ComponentStore {
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.storages.values().map(|s| s.type_name()).collect();
        names.sort_unstable();
        f.debug_struct("ComponentStore")
            .field("component_types", &names)
            .finish()
    }
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed storage for `T`, if any `T` was ever inserted.
    pub fn storage<T: Component>(&self) -> Option<&Storage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<Storage<T>>())
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut Storage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<Storage<T>>())
    }

    fn storage_or_insert<T: Component>(&mut self) -> &mut Storage<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Storage::<T>::default()))
            .as_any_mut()
            .downcast_mut::<Storage<T>>()
            .unwrap_or_else(|| unreachable!("storage keyed by TypeId of its own component"))
    }

    /// Attach or replace `T` on `entity`. Returns the previous value.
    pub fn insert<T: Component>(&mut self, entity: EntityId, value: T) -> Option<T> {
        self.storage_or_insert::<T>().entries.insert(entity, value)
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        self.storage_mut::<T>()?.entries.remove(&entity)
    }

    pub fn contains<T: Component>(&self, entity: EntityId) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Number of entities carrying a `T`.
    pub fn len<T: Component>(&self) -> usize {
        self.storage::<T>().map_or(0, |s| s.len())
    }

    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.storage::<T>().into_iter().flat_map(|s| s.iter())
    }

    pub fn iter_mut<T: Component>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.storage_mut::<T>().into_iter().flat_map(|s| s.iter_mut())
    }

    /// Drop every component attached to `entity`. Returns how many were removed.
    pub fn remove_entity(&mut self, entity: EntityId) -> usize {
        self.storages
            .values_mut()
            .map(|s| s.remove_entity(entity))
            .filter(|removed| *removed)
            .count()
    }

    /// Visit every entity that has both an `A` and a `B`, in entity order.
    ///
    /// # Panics
    ///
    /// Panics if `A` and `B` are the same type.
    pub fn join_mut<A, B>(&mut self, mut f: impl FnMut(EntityId, &mut A, &B))
    where
        A: Component,
        B: Component,
    {
        assert_ne!(
            TypeId::of::<A>(),
            TypeId::of::<B>(),
            "join_mut needs two distinct component types"
        );
        // Detach A's storage so B can be borrowed from the map alongside it.
        let Some(mut left) = self.storages.remove(&TypeId::of::<A>()) else {
            return;
        };
        if let (Some(a), Some(b)) = (
            left.as_any_mut().downcast_mut::<Storage<A>>(),
            self.storage::<B>(),
        ) {
            for (entity, av) in a.entries.iter_mut() {
                if let Some(bv) = b.entries.get(entity) {
                    f(*entity, av, bv);
                }
            }
        }
        self.storages.insert(TypeId::of::<A>(), left);
    }
}
