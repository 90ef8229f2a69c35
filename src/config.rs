//! Simulation tuning parameters
//!
//! Every gameplay constant lives here so a harness can reshape the course
//! without recompiling. Defaults reproduce the classic 600x700 course.
//! Coordinates are screen-style: y grows downward, the ground line sits at
//! the bottom of the play area.

use std::fs;
use std::path::Path;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading/validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("gap range {min}..{max} is empty")]
    EmptyGapRange { min: i32, max: i32 },
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    #[error("sprite dimensions must be non-zero")]
    ZeroSprite,
}

/// All tunable simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Course geometry ===
    /// Play area width (spawn x of recycled obstacles)
    pub play_width: f32,
    /// Play area height
    pub play_height: f32,
    /// Ground line y
    pub ground_y: f32,

    // === Avatar ===
    /// Starting position of every avatar
    pub avatar_start: Vec2,
    /// Avatar silhouette width in pixels
    pub avatar_width: u32,
    /// Avatar silhouette height in pixels
    pub avatar_height: u32,
    /// Gravity term of the quadratic fall law
    pub gravity: f32,
    /// Vertical velocity set by a flap (negative = upward)
    pub flap_impulse: f32,
    /// Downward per-tick displacement clamp
    pub terminal_fall: f32,
    /// Extra displacement applied while rising (rising is never clamped)
    pub rise_bias: f32,
    /// Tilt snapped to while rising (degrees, display only)
    pub max_tilt_up: f32,
    /// Tilt floor while diving (degrees, display only)
    pub max_tilt_down: f32,
    /// Per-tick tilt decay while diving
    pub tilt_rate: f32,
    /// Height band above the last flap reference that still holds the up-tilt
    pub tilt_hold_margin: f32,
    /// Inset subtracted from the avatar's lower edge for the ground bound
    pub ground_inset: f32,
    /// How far above the play area an avatar may stray before elimination
    pub ceiling_slack: f32,

    // === Obstacles ===
    /// Leftward speed shared by obstacles and the ground
    pub scroll_speed: f32,
    /// Vertical opening between the two barriers
    pub gap_size: f32,
    /// Inclusive lower bound of the random gap-top draw
    pub gap_min: i32,
    /// Exclusive upper bound of the random gap-top draw
    pub gap_max: i32,
    /// Barrier silhouette width in pixels
    pub barrier_width: u32,
    /// Barrier silhouette height in pixels
    pub barrier_height: u32,
    /// x of the obstacle seeded at world creation
    pub first_obstacle_x: f32,
    /// x at which recycled obstacles spawn
    pub spawn_x: f32,
    /// Width of one ground tile
    pub ground_tile_width: f32,

    // === Fitness shaping ===
    /// Awarded to every living avatar each tick
    pub survival_bonus: f32,
    /// Subtracted on elimination by collision
    pub collision_penalty: f32,
    /// Awarded to every living avatar per score increment
    pub pass_bonus: f32,

    // === Pacing ===
    /// Ticks per second when a caller paces the run
    pub tick_rate: f32,
    /// Hard tick budget per run (None = run until all are eliminated)
    pub tick_cap: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            play_width: 600.0,
            play_height: 700.0,
            ground_y: 700.0,

            avatar_start: Vec2::new(230.0, 350.0),
            avatar_width: 68,
            avatar_height: 48,
            gravity: 3.0,
            flap_impulse: -11.0,
            terminal_fall: 16.0,
            rise_bias: 2.0,
            max_tilt_up: 20.0,
            max_tilt_down: -90.0,
            tilt_rate: 20.0,
            tilt_hold_margin: 50.0,
            ground_inset: 10.0,
            ceiling_slack: 50.0,

            scroll_speed: 5.0,
            gap_size: 200.0,
            gap_min: 50,
            gap_max: 450,
            barrier_width: 104,
            barrier_height: 640,
            first_obstacle_x: 700.0,
            spawn_x: 600.0,
            ground_tile_width: 672.0,

            survival_bonus: 0.1,
            collision_penalty: 1.0,
            pass_bonus: 5.0,

            tick_rate: 30.0,
            tick_cap: None,
        }
    }
}

impl SimConfig {
    /// Load a config from a JSON file and validate it. Missing fields fall
    /// back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks beyond what the type system gives us
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gap_max <= self.gap_min {
            return Err(ConfigError::EmptyGapRange {
                min: self.gap_min,
                max: self.gap_max,
            });
        }
        for (name, value) in [
            ("terminal_fall", self.terminal_fall),
            ("scroll_speed", self.scroll_speed),
            ("gap_size", self.gap_size),
            ("ground_tile_width", self.ground_tile_width),
            ("tick_rate", self.tick_rate),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.avatar_width == 0
            || self.avatar_height == 0
            || self.barrier_width == 0
            || self.barrier_height == 0
        {
            return Err(ConfigError::ZeroSprite);
        }
        Ok(())
    }

    /// Wall-clock duration of one tick at the configured rate
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.tick_rate)
    }
}
