//! The concurrency gateway.
//!
//! [`Game`] owns the world, the tick scheduler and the peer-to-character
//! mapping behind one reader/writer lock. Every public operation is a single
//! critical section: ticks, spawns and commands take the write side, lookups
//! and queries take the read side. Callers share a `Game` through an `Arc`.
//!
//! A panic inside a write section poisons the lock. From then on every call
//! returns [`GameError::Poisoned`]; the half-updated world is never exposed.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use simcore_common::{EntityId, PeerId};
use simcore_ecs::{Position, Velocity};

use crate::command::{Command, Query};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::scheduler::TickScheduler;
use crate::system::Pipeline;
use crate::world::World;

/// Everything guarded by the gateway lock. World and mapping change together.
#[derive(Debug)]
struct GameState {
    world: World,
    scheduler: TickScheduler,
    characters: HashMap<PeerId, EntityId>,
}

/// Single authoritative world owner for the process.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    state: RwLock<GameState>,
}

impl Game {
    /// A game running the stock pipeline.
    pub fn new(config: GameConfig) -> Self {
        Self::with_pipeline(config, Pipeline::default_systems())
    }

    pub fn with_pipeline(config: GameConfig, pipeline: Pipeline) -> Self {
        tracing::info!(systems = ?pipeline, ?config, "game created");
        let scheduler = TickScheduler::new(pipeline, config.first_tick);
        Self {
            config,
            state: RwLock::new(GameState {
                world: World::new(),
                scheduler,
                characters: HashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Whether a panic during exclusive access has invalidated this game.
    pub fn is_poisoned(&self) -> bool {
        self.state.is_poisoned()
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GameState>, GameError> {
        self.state.write().map_err(|_| {
            tracing::error!("refusing exclusive access to poisoned world");
            GameError::Poisoned
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GameState>, GameError> {
        self.state.read().map_err(|_| {
            tracing::error!("refusing shared access to poisoned world");
            GameError::Poisoned
        })
    }

    /// Advance the simulation by one tick measured against the monotonic
    /// clock. Returns the delta that was integrated.
    pub fn update(&self) -> Result<Duration, GameError> {
        let mut guard = self.write()?;
        let GameState { world, scheduler, .. } = &mut *guard;
        Ok(scheduler.tick(world))
    }

    /// [`update`](Self::update) with an externally supplied timestamp.
    pub fn update_at(&self, now: Instant) -> Result<Duration, GameError> {
        let mut guard = self.write()?;
        let GameState { world, scheduler, .. } = &mut *guard;
        Ok(scheduler.tick_at(world, now))
    }

    /// Advance one tick with a fixed delta, independent of the wall clock.
    pub fn step(&self, delta: Duration) -> Result<(), GameError> {
        let mut guard = self.write()?;
        let GameState { world, scheduler, .. } = &mut *guard;
        scheduler.advance(world, delta);
        Ok(())
    }

    /// Create a character for `peer` with default `Position` and `Velocity`
    /// and map the peer to it, replacing any earlier mapping.
    pub fn spawn_player_character(&self, peer: PeerId) -> Result<EntityId, GameError> {
        let mut guard = self.write()?;
        let state = &mut *guard;

        let entity = state.world.create();
        state.world.set_component(entity, Position::default())?;
        state.world.set_component(entity, Velocity::default())?;

        if let Some(previous) = state.characters.insert(peer, entity) {
            if self.config.despawn_on_respawn && state.world.is_alive(previous) {
                state.world.despawn(previous)?;
                tracing::debug!(%peer, %previous, %entity, "respawned, previous character despawned");
            } else {
                tracing::warn!(%peer, %previous, %entity, "respawned, previous character left in world");
            }
        } else {
            tracing::debug!(%peer, %entity, "player character spawned");
        }
        Ok(entity)
    }

    pub fn get_player_character(&self, peer: PeerId) -> Result<EntityId, GameError> {
        let guard = self.read()?;
        guard
            .characters
            .get(&peer)
            .copied()
            .ok_or(GameError::UnknownPeer(peer))
    }

    /// Drop the mapping for `peer` and despawn its character. A character
    /// already despawned by a command is only unmapped.
    pub fn release_player_character(&self, peer: PeerId) -> Result<EntityId, GameError> {
        let mut guard = self.write()?;
        let state = &mut *guard;
        let entity = state
            .characters
            .remove(&peer)
            .ok_or(GameError::UnknownPeer(peer))?;
        if state.world.is_alive(entity) {
            state.world.despawn(entity)?;
        }
        tracing::debug!(%peer, %entity, "player character released");
        Ok(entity)
    }

    /// Number of peers with a mapped character.
    pub fn peer_count(&self) -> Result<usize, GameError> {
        Ok(self.read()?.characters.len())
    }

    /// Run `command` with exclusive access to the world.
    pub fn command<C: Command>(&self, command: C) -> Result<(), GameError> {
        let mut guard = self.write()?;
        command.execute(&mut guard.world)?;
        Ok(())
    }

    /// Run `query` with shared access to the world.
    pub fn query<Q: Query>(&self, query: Q) -> Result<Q::Output, GameError> {
        let guard = self.read()?;
        Ok(query.execute(&guard.world)?)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
