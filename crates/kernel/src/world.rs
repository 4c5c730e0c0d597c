use simcore_common::EntityId;
use simcore_ecs::{Component, ComponentStore, EntityAllocator};

use crate::error::WorldError;

/// The authoritative world state.
///
/// Owns the identity allocator and every component storage. All mutations
/// take `&mut self`, so they can only happen where the caller holds exclusive
/// access (inside the gateway's write section).
///
/// Invariant: a component entry exists for an entity only while that entity
/// is live.
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityAllocator,
    components: ComponentStore,
    tick: u64,
}

impl World {
    /// Create an empty world at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Live entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.allocator.iter_alive()
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Allocate a new live entity with no components.
    pub fn create(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        tracing::trace!(entity = %id, "entity created");
        id
    }

    /// Remove an entity and every component attached to it.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), WorldError> {
        if !self.allocator.deallocate(id) {
            return Err(WorldError::UnknownEntity(id));
        }
        let removed = self.components.remove_entity(id);
        tracing::trace!(entity = %id, components = removed, "entity despawned");
        Ok(())
    }

    /// Attach `value` to `id`, replacing any existing `T`.
    pub fn set_component<T: Component>(&mut self, id: EntityId, value: T) -> Result<(), WorldError> {
        self.ensure_alive(id)?;
        self.components.insert(id, value);
        Ok(())
    }

    pub fn get_component<T: Component>(&self, id: EntityId) -> Result<&T, WorldError> {
        self.ensure_alive(id)?;
        self.components
            .get::<T>(id)
            .ok_or_else(|| component_not_found::<T>(id))
    }

    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Result<&mut T, WorldError> {
        self.ensure_alive(id)?;
        self.components
            .get_mut::<T>(id)
            .ok_or_else(|| component_not_found::<T>(id))
    }

    /// Detach and return the `T` on `id`.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Result<T, WorldError> {
        self.ensure_alive(id)?;
        self.components
            .remove::<T>(id)
            .ok_or_else(|| component_not_found::<T>(id))
    }

    /// `false` for dead entities as well as live ones without a `T`.
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id) && self.components.contains::<T>(id)
    }

    /// Every `(entity, &T)` pair, in entity order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.components.iter::<T>()
    }

    /// Visit every entity carrying both an `A` and a `B`. Entities missing
    /// either component are skipped.
    pub fn join_mut<A: Component, B: Component>(&mut self, f: impl FnMut(EntityId, &mut A, &B)) {
        self.components.join_mut::<A, B>(f);
    }

    fn ensure_alive(&self, id: EntityId) -> Result<(), WorldError> {
        if self.allocator.is_alive(id) {
            Ok(())
        } else {
            Err(WorldError::UnknownEntity(id))
        }
    }
}

fn component_not_found<T>(entity: EntityId) -> WorldError {
    WorldError::ComponentNotFound {
        entity,
        component: short_type_name::<T>(),
    }
}

/// `simcore_ecs::components::Position` -> `Position`.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore_ecs::{Position, Velocity};

    #[test]
    fn world_starts_empty() {
        let w = World::new();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.entity_count(), 0);
    }

    #[test]
    fn create_registers_live_entity_without_components() {
        let mut w = World::new();
        let id = w.create();
        assert!(w.is_alive(id));
        assert_eq!(w.entity_count(), 1);
        assert!(!w.has_component::<Position>(id));
    }

    #[test]
    fn set_and_get_component() {
        let mut w = World::new();
        let id = w.create();
        w.set_component(id, Position::new(1.0, 2.0)).unwrap();
        assert_eq!(w.get_component::<Position>(id).unwrap(), &Position::new(1.0, 2.0));

        w.set_component(id, Position::new(3.0, 4.0)).unwrap();
        assert_eq!(w.get_component::<Position>(id).unwrap(), &Position::new(3.0, 4.0));
    }

    #[test]
    fn missing_component_is_reported_by_name() {
        let mut w = World::new();
        let id = w.create();
        let err = w.get_component::<Velocity>(id).unwrap_err();
        assert_eq!(
            err,
            WorldError::ComponentNotFound {
                entity: id,
                component: "Velocity"
            }
        );
    }

    #[test]
    fn set_component_on_dead_entity_fails() {
        let mut w = World::new();
        let id = w.create();
        w.despawn(id).unwrap();
        assert_eq!(
            w.set_component(id, Position::default()),
            Err(WorldError::UnknownEntity(id))
        );
        assert_eq!(
            w.get_component::<Position>(id).unwrap_err(),
            WorldError::UnknownEntity(id)
        );
    }

    #[test]
    fn despawn_drops_components() {
        let mut w = World::new();
        let id = w.create();
        w.set_component(id, Position::default()).unwrap();
        w.set_component(id, Velocity::default()).unwrap();
        w.despawn(id).unwrap();

        assert_eq!(w.entity_count(), 0);
        assert_eq!(w.iter::<Position>().count(), 0);
        assert_eq!(w.iter::<Velocity>().count(), 0);
    }

    #[test]
    fn components_do_not_leak_into_recycled_slot() {
        let mut w = World::new();
        let old = w.create();
        w.set_component(old, Position::new(9.0, 9.0)).unwrap();
        w.despawn(old).unwrap();

        let new = w.create();
        assert_eq!(new.index(), old.index());
        assert!(!w.has_component::<Position>(new));
    }

    #[test]
    fn despawn_twice_is_unknown_entity() {
        let mut w = World::new();
        let id = w.create();
        w.despawn(id).unwrap();
        assert_eq!(w.despawn(id), Err(WorldError::UnknownEntity(id)));
    }

    #[test]
    fn remove_component_returns_value() {
        let mut w = World::new();
        let id = w.create();
        w.set_component(id, Velocity::new(1.0, 0.0)).unwrap();
        assert_eq!(w.remove_component::<Velocity>(id).unwrap(), Velocity::new(1.0, 0.0));
        assert!(matches!(
            w.remove_component::<Velocity>(id),
            Err(WorldError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn get_component_mut_edits_in_place() {
        let mut w = World::new();
        let id = w.create();
        w.set_component(id, Position::default()).unwrap();
        w.get_component_mut::<Position>(id).unwrap().0.x = 5.0;
        assert_eq!(w.get_component::<Position>(id).unwrap().0.x, 5.0);
    }

    #[test]
    fn entities_lists_live_ids() {
        let mut w = World::new();
        let a = w.create();
        let b = w.create();
        let c = w.create();
        w.despawn(b).unwrap();
        assert_eq!(w.entities().collect::<Vec<_>>(), vec![a, c]);
    }
}
