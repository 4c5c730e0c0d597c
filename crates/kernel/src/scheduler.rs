//! Wall-clock tick scheduling.
//!
//! The scheduler measures elapsed monotonic time since the previous tick and
//! drives its [`Pipeline`] once per invocation. The external driver decides
//! the cadence; nothing here sleeps.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::system::Pipeline;
use crate::world::World;

/// Delta policy for the first tick after construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstTick {
    /// The first tick integrates with a zero delta. Reproducible: spawning
    /// and immediately ticking never moves anything.
    #[default]
    Zero,
    /// The first delta is the real time elapsed since construction.
    SinceConstruction,
}

/// Drives a [`Pipeline`] once per tick with the measured delta.
#[derive(Debug)]
pub struct TickScheduler {
    pipeline: Pipeline,
    first_tick: FirstTick,
    last_tick: Instant,
    started: bool,
}

impl TickScheduler {
    pub fn new(pipeline: Pipeline, first_tick: FirstTick) -> Self {
        Self::starting_at(pipeline, first_tick, Instant::now())
    }

    /// Construct with an explicit start instant (for injected clocks).
    pub fn starting_at(pipeline: Pipeline, first_tick: FirstTick, start: Instant) -> Self {
        Self {
            pipeline,
            first_tick,
            last_tick: start,
            started: false,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn first_tick(&self) -> FirstTick {
        self.first_tick
    }

    /// Run one tick measured against the monotonic clock.
    pub fn tick(&mut self, world: &mut World) -> Duration {
        self.tick_at(world, Instant::now())
    }

    /// Run one tick as if the clock read `now`. A `now` earlier than the
    /// previous tick yields a zero delta.
    pub fn tick_at(&mut self, world: &mut World, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_tick);
        let delta = if self.started || self.first_tick == FirstTick::SinceConstruction {
            elapsed
        } else {
            Duration::ZERO
        };
        self.started = true;
        self.last_tick = now;
        self.advance(world, delta);
        delta
    }

    /// Run one tick with an explicit delta. The wall-clock reference point is
    /// left untouched.
    pub fn advance(&mut self, world: &mut World, delta: Duration) {
        let tick = world.advance_tick();
        let _span = tracing::debug_span!("tick", tick, delta_ms = delta.as_secs_f64() * 1e3).entered();
        self.pipeline.run(world, delta.as_secs_f32());
    }
}
