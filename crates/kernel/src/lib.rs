//! World Kernel: authoritative world state, tick scheduling and the
//! concurrency gateway external threads go through.
//!
//! # Invariants
//! - All world mutations happen inside the gateway's exclusive section.
//! - Systems run strictly in pipeline order, one at a time.
//! - Queries observe the state after the latest completed exclusive operation.

pub mod command;
pub mod config;
pub mod error;
pub mod game;
pub mod scheduler;
pub mod system;
pub mod world;

pub use command::{Command, EntityCount, PositionOf, Query, SetVelocity, Teleport, VelocityOf};
pub use config::GameConfig;
pub use error::{GameError, WorldError};
pub use game::Game;
pub use scheduler::{FirstTick, TickScheduler};
pub use system::{MovementSystem, Pipeline, System};
pub use world::World;

pub use simcore_common::{EntityId, PeerId};
pub use simcore_ecs::{Position, Velocity};

pub fn crate_info() -> &'static str {
    "simcore-kernel v0.1.0"
}
