//! Externally supplied units of work.
//!
//! A [`Command`] runs under exclusive access and may mutate the world. A
//! [`Query`] runs under shared access against `&World` and returns a typed
//! result. Closures of the right shape implement both traits.

use simcore_common::EntityId;
use simcore_ecs::{Position, Velocity};

use crate::error::WorldError;
use crate::world::World;

/// A single-use mutation executed inside the gateway's exclusive section.
pub trait Command {
    fn execute(self, world: &mut World) -> Result<(), WorldError>;
}

impl<F> Command for F
where
    F: FnOnce(&mut World) -> Result<(), WorldError>,
{
    fn execute(self, world: &mut World) -> Result<(), WorldError> {
        self(world)
    }
}

/// A single-use read executed inside the gateway's shared section.
pub trait Query {
    type Output;

    fn execute(self, world: &World) -> Result<Self::Output, WorldError>;
}

impl<F, R> Query for F
where
    F: FnOnce(&World) -> Result<R, WorldError>,
{
    type Output = R;

    fn execute(self, world: &World) -> Result<R, WorldError> {
        self(world)
    }
}

/// Replace the velocity of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetVelocity {
    pub entity: EntityId,
    pub velocity: Velocity,
}

impl Command for SetVelocity {
    fn execute(self, world: &mut World) -> Result<(), WorldError> {
        world.set_component(self.entity, self.velocity)
    }
}

/// Move an entity to an absolute position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Teleport {
    pub entity: EntityId,
    pub position: Position,
}

impl Command for Teleport {
    fn execute(self, world: &mut World) -> Result<(), WorldError> {
        world.set_component(self.entity, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOf(pub EntityId);

impl Query for PositionOf {
    type Output = Position;

    fn execute(self, world: &World) -> Result<Position, WorldError> {
        world.get_component::<Position>(self.0).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VelocityOf(pub EntityId);

impl Query for VelocityOf {
    type Output = Velocity;

    fn execute(self, world: &World) -> Result<Velocity, WorldError> {
        world.get_component::<Velocity>(self.0).copied()
    }
}

/// Number of live entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCount;

impl Query for EntityCount {
    type Output = usize;

    fn execute(self, world: &World) -> Result<usize, WorldError> {
        Ok(world.entity_count())
    }
}
