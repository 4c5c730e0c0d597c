//! Per-tick update units and the ordered pipeline that runs them.

use simcore_ecs::{Position, Velocity};

use crate::world::World;

/// A unit of per-tick logic.
///
/// Systems must be bounded and non-blocking: they run inside the gateway's
/// exclusive section.
pub trait System: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Advance this system by `delta` seconds.
    fn tick(&mut self, world: &mut World, delta: f32);
}

/// Integrates `Position` by `Velocity` for every entity that has both.
#[derive(Debug, Default, Clone, Copy)]
pub struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn tick(&mut self, world: &mut World, delta: f32) {
        world.join_mut::<Position, Velocity>(|_, position, velocity| {
            position.0 += velocity.0 * delta;
        });
    }
}

/// Systems in a fixed, explicitly configured order.
///
/// Each system runs to completion before the next one starts.
#[derive(Default)]
pub struct Pipeline {
    systems: Vec<Box<dyn System>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.systems.iter().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock server pipeline: movement only.
    pub fn default_systems() -> Self {
        Self::new().with(MovementSystem)
    }

    pub fn with(mut self, system: impl System + 'static) -> Self {
        self.push(system);
        self
    }

    pub fn push(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    pub fn run(&mut self, world: &mut World, delta: f32) {
        for system in &mut self.systems {
            let _span = tracing::debug_span!("system", name = system.name()).entered();
            system.tick(world, delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn spawn_mover(world: &mut World, p: (f32, f32), v: (f32, f32)) -> simcore_common::EntityId {
        let id = world.create();
        world.set_component(id, Position::new(p.0, p.1)).unwrap();
        world.set_component(id, Velocity::new(v.0, v.1)).unwrap();
        id
    }

    #[test]
    fn movement_integrates_position() {
        let mut world = World::new();
        let id = spawn_mover(&mut world, (1.0, -2.0), (3.0, 4.0));
        MovementSystem.tick(&mut world, 0.25);
        let p = world.get_component::<Position>(id).unwrap();
        assert!((p.0.x - 1.75).abs() < 1e-6);
        assert!((p.0.y - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn movement_skips_entities_without_velocity() {
        let mut world = World::new();
        let still = world.create();
        world.set_component(still, Position::new(4.0, 4.0)).unwrap();
        let drifting = world.create();
        world.set_component(drifting, Velocity::new(1.0, 1.0)).unwrap();

        MovementSystem.tick(&mut world, 1.0);

        assert_eq!(world.get_component::<Position>(still).unwrap(), &Position::new(4.0, 4.0));
        assert!(!world.has_component::<Position>(drifting));
    }

    #[test]
    fn zero_delta_is_a_noop() {
        let mut world = World::new();
        let id = spawn_mover(&mut world, (2.0, 3.0), (10.0, 10.0));
        MovementSystem.tick(&mut world, 0.0);
        assert_eq!(world.get_component::<Position>(id).unwrap(), &Position::new(2.0, 3.0));
    }

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        fn tick(&mut self, _world: &mut World, _delta: f32) {
            self.log.lock().unwrap().push(self.label);
        }
    }

    #[test]
    fn pipeline_runs_in_configured_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::new()
            .with(Recorder { label: "first", log: log.clone() })
            .with(Recorder { label: "second", log: log.clone() })
            .with(Recorder { label: "third", log: log.clone() });

        let mut world = World::new();
        pipeline.run(&mut world, 0.1);
        pipeline.run(&mut world, 0.1);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first", "second", "third", "first", "second", "third"]
        );
        assert_eq!(pipeline.names(), vec!["first", "second", "third"]);
    }

    /// Reads positions after movement in the same tick.
    struct PositionProbe {
        seen: Arc<Mutex<Vec<f32>>>,
    }

    impl System for PositionProbe {
        fn tick(&mut self, world: &mut World, _delta: f32) {
            let xs = world.iter::<Position>().map(|(_, p)| p.0.x);
            self.seen.lock().unwrap().extend(xs);
        }
    }

    #[test]
    fn later_systems_observe_completed_earlier_systems() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::default_systems().with(PositionProbe { seen: seen.clone() });
        let mut world = World::new();
        spawn_mover(&mut world, (0.0, 0.0), (2.0, 0.0));
        spawn_mover(&mut world, (1.0, 0.0), (2.0, 0.0));

        pipeline.run(&mut world, 0.5);

        assert_eq!(*seen.lock().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn default_pipeline_contains_movement() {
        assert_eq!(Pipeline::default_systems().names(), vec!["movement"]);
    }
}
