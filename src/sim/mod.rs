//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed tick clock per world
//! - Seeded RNG only, drawn only at obstacle creation
//! - Stable arena order (avatar ids are stable across eliminations)
//! - No rendering or platform dependencies

pub mod avatar;
pub mod collision;
pub mod mask;
pub mod obstacle;
pub mod runner;
pub mod state;
pub mod tick;

pub use avatar::Avatar;
pub use collision::CollisionMasks;
pub use mask::SpriteMask;
pub use obstacle::{Ground, Obstacle, ObstacleField};
pub use runner::{PopulationRunner, RunOutcome};
pub use state::{
    AvatarResult, AvatarView, EliminationCause, GroundView, ObstacleView, Phase, Population,
    SceneSnapshot, World,
};
pub use tick::{TickReport, tick};
