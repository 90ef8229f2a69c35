//! World state and the population arena
//!
//! A [`World`] is one simulation timeline: one tick clock, one obstacle
//! field, one score, and a population of avatars that share them. Avatars,
//! their decision policies, and their fitness accumulators live in
//! index-aligned parallel vectors with stable ids; elimination swap-removes
//! all three together and freezes a result record, so nothing dangles and
//! a retired avatar's fitness can never change again.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::avatar::Avatar;
use super::collision::CollisionMasks;
use super::obstacle::{Ground, ObstacleField};
use crate::config::{ConfigError, SimConfig};
use crate::policy::DecisionPolicy;

/// Simulation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Running,
    /// Terminal: no living avatars remain
    AllEliminated,
}

/// Why an avatar left the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EliminationCause {
    Collision,
    OutOfBounds,
    PolicyFault,
}

/// Frozen record of one avatar's run
#[derive(Debug, Clone, Serialize)]
pub struct AvatarResult {
    pub id: u32,
    pub fitness: f32,
    /// Tick of elimination; None when the avatar outlived the run
    pub eliminated_at: Option<u64>,
    pub cause: Option<EliminationCause>,
}

/// Living avatars plus their per-slot policy and fitness bookkeeping
pub struct Population {
    avatars: Vec<Avatar>,
    policies: Vec<Box<dyn DecisionPolicy>>,
    fitness: Vec<f32>,
    retired: Vec<AvatarResult>,
}

impl Population {
    pub fn from_policies(policies: Vec<Box<dyn DecisionPolicy>>, config: &SimConfig) -> Self {
        let avatars = (0..policies.len())
            .map(|i| Avatar::new(i as u32, config.avatar_start, config))
            .collect::<Vec<_>>();
        let fitness = vec![0.0; policies.len()];
        Self {
            avatars,
            policies,
            fitness,
            retired: Vec::new(),
        }
    }

    pub fn living(&self) -> usize {
        self.avatars.len()
    }

    pub fn avatars(&self) -> &[Avatar] {
        &self.avatars
    }

    pub fn avatar(&self, slot: usize) -> &Avatar {
        &self.avatars[slot]
    }

    pub fn avatar_mut(&mut self, slot: usize) -> &mut Avatar {
        &mut self.avatars[slot]
    }

    pub fn policy_mut(&mut self, slot: usize) -> &mut dyn DecisionPolicy {
        &mut *self.policies[slot]
    }

    pub fn fitness_of(&self, slot: usize) -> f32 {
        self.fitness[slot]
    }

    pub fn add_fitness(&mut self, slot: usize, delta: f32) {
        self.fitness[slot] += delta;
    }

    /// x of the foremost living avatar
    pub fn lead_x(&self) -> Option<f32> {
        self.avatars.iter().map(|a| a.pos.x).reduce(f32::max)
    }

    /// Remove a slot from every parallel vector and freeze its record
    pub fn eliminate(&mut self, slot: usize, tick: u64, cause: EliminationCause) {
        let avatar = self.avatars.swap_remove(slot);
        drop(self.policies.swap_remove(slot));
        let fitness = self.fitness.swap_remove(slot);
        self.retired.push(AvatarResult {
            id: avatar.id,
            fitness,
            eliminated_at: Some(tick),
            cause: Some(cause),
        });
    }

    pub fn retired(&self) -> &[AvatarResult] {
        &self.retired
    }

    /// One record per avatar ever created, sorted by id. Living avatars get
    /// their current fitness and no elimination tick.
    pub fn results(&self) -> Vec<AvatarResult> {
        let mut results: Vec<AvatarResult> = self.retired.clone();
        results.extend(self.avatars.iter().enumerate().map(|(slot, avatar)| {
            AvatarResult {
                id: avatar.id,
                fitness: self.fitness[slot],
                eliminated_at: None,
                cause: None,
            }
        }));
        results.sort_by_key(|r| r.id);
        results
    }
}

/// Per-avatar entry of a scene snapshot
#[derive(Debug, Clone, Serialize)]
pub struct AvatarView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub tilt: f32,
    pub alive: bool,
}

/// Per-obstacle entry of a scene snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub x: f32,
    pub gap_top: f32,
    pub gap_bottom: f32,
}

/// Ground band entry of a scene snapshot
#[derive(Debug, Clone, Serialize)]
pub struct GroundView {
    pub y: f32,
    pub tile_offsets: [f32; 2],
}

/// Everything a renderer needs for one frame. The core never draws; it
/// hands this out once per tick and moves on.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    pub tick: u64,
    pub score: u32,
    pub living: usize,
    pub avatars: Vec<AvatarView>,
    pub obstacles: Vec<ObstacleView>,
    pub ground: GroundView,
}

/// One complete simulation timeline
pub struct World {
    pub config: SimConfig,
    pub seed: u64,
    pub ticks: u64,
    pub score: u32,
    pub phase: Phase,
    pub ground: Ground,
    pub field: ObstacleField,
    pub population: Population,
    pub(crate) masks: CollisionMasks,
    pub(crate) rng: Pcg32,
}

impl World {
    /// Validate the config and build a world with one seeded obstacle and
    /// one avatar per policy.
    pub fn new(
        config: SimConfig,
        seed: u64,
        policies: Vec<Box<dyn DecisionPolicy>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let field = ObstacleField::new(&config, &mut rng);
        let ground = Ground::new(&config);
        let masks = CollisionMasks::solid(&config);
        let population = Population::from_policies(policies, &config);
        Ok(Self {
            config,
            seed,
            ticks: 0,
            score: 0,
            phase: Phase::Running,
            ground,
            field,
            population,
            masks,
            rng,
        })
    }

    /// Replace the default solid silhouettes with real sprite masks
    pub fn with_masks(mut self, masks: CollisionMasks) -> Self {
        self.masks = masks;
        self
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            tick: self.ticks,
            score: self.score,
            living: self.population.living(),
            avatars: self
                .population
                .avatars()
                .iter()
                .map(|a| AvatarView {
                    id: a.id,
                    x: a.pos.x,
                    y: a.pos.y,
                    tilt: a.tilt,
                    alive: true,
                })
                .collect(),
            obstacles: self
                .field
                .obstacles()
                .iter()
                .map(|o| ObstacleView {
                    x: o.x,
                    gap_top: o.gap_top,
                    gap_bottom: o.gap_bottom,
                })
                .collect(),
            ground: GroundView {
                y: self.ground.y,
                tile_offsets: [self.ground.x1, self.ground.x2],
            },
        }
    }
}
