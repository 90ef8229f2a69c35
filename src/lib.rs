//! Gapwing - a headless side-scrolling gauntlet simulator
//!
//! Core modules:
//! - `sim`: deterministic simulation (avatar physics, obstacle field, mask
//!   collision, population ticks)
//! - `policy`: the decision seam an external learner plugs into
//! - `config`: tunable simulation parameters

pub mod config;
pub mod policy;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use policy::{DecisionPolicy, FLAP_THRESHOLD, Observation};
pub use sim::{Phase, PopulationRunner, RunOutcome, SceneSnapshot, World};
