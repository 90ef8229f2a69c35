//! Population run loop
//!
//! Drives [`tick`] until every avatar is gone, the configured tick cap is
//! reached, or an external stop flag fires. The stop flag is honored at
//! tick boundaries only, so no partial-tick state ever escapes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::state::{AvatarResult, Phase, SceneSnapshot, World};
use super::tick::{TickReport, tick};
use crate::config::{ConfigError, SimConfig};
use crate::policy::DecisionPolicy;

/// Final accounting of one population run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Ticks executed
    pub ticks: u64,
    /// Obstacles passed by the population
    pub score: u32,
    /// Whether the external stop flag ended the run
    pub stopped: bool,
    /// One record per avatar, sorted by id
    pub results: Vec<AvatarResult>,
}

/// Runs one world to completion
pub struct PopulationRunner {
    world: World,
    stop: Arc<AtomicBool>,
}

impl PopulationRunner {
    pub fn new(
        config: SimConfig,
        seed: u64,
        policies: Vec<Box<dyn DecisionPolicy>>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::from_world(World::new(config, seed, policies)?))
    }

    pub fn from_world(world: World) -> Self {
        Self {
            world,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Shared flag for external shutdown; set it from anywhere and the run
    /// ends cleanly before the next tick.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Advance a single tick
    pub fn step(&mut self) -> TickReport {
        tick(&mut self.world)
    }

    /// Run to completion, ignoring snapshots
    pub fn run(&mut self) -> RunOutcome {
        self.run_observed(|_| {})
    }

    /// Run to completion, handing the observer a scene snapshot after every
    /// tick. The observer is where a renderer (or pacing sleep) plugs in.
    pub fn run_observed<F>(&mut self, mut observe: F) -> RunOutcome
    where
        F: FnMut(&SceneSnapshot),
    {
        let cap = self.world.config.tick_cap;
        let mut stopped = false;

        while self.world.phase == Phase::Running {
            if self.stop.load(Ordering::Relaxed) {
                stopped = true;
                log::info!("stop requested, ending run at tick {}", self.world.ticks);
                break;
            }
            if let Some(cap) = cap {
                if self.world.ticks >= cap {
                    log::info!("tick cap {cap} reached");
                    break;
                }
            }
            tick(&mut self.world);
            observe(&self.world.snapshot());
        }

        RunOutcome {
            ticks: self.world.ticks,
            score: self.world.score,
            stopped,
            results: self.world.population.results(),
        }
    }
}
