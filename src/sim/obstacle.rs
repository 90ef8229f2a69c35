//! Obstacles, the obstacle field, and the scrolling ground
//!
//! An obstacle is a pair of barriers with a randomly-placed gap; the field
//! keeps the active set alive: it recycles obstacles that scrolled off the
//! left edge and appends a fresh one each time the population passes one.
//! The field is never empty.

use rand::Rng;

use crate::config::SimConfig;

/// A paired top/bottom barrier with a gap, scrolling leftward
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    /// Left edge of both barriers
    pub x: f32,
    /// Bottom edge of the top barrier (top edge of the gap)
    pub gap_top: f32,
    /// Top edge of the bottom barrier
    pub gap_bottom: f32,
    /// One-shot flag: set the first tick the population passes this x
    passed: bool,
}

impl Obstacle {
    /// Create an obstacle with a random gap position
    pub fn spawn(x: f32, config: &SimConfig, rng: &mut impl Rng) -> Self {
        let gap_top = rng.random_range(config.gap_min..config.gap_max) as f32;
        Self::with_gap(x, gap_top, config)
    }

    /// Create an obstacle with an explicit gap position (scripted courses)
    pub fn with_gap(x: f32, gap_top: f32, config: &SimConfig) -> Self {
        Self {
            x,
            gap_top,
            gap_bottom: gap_top + config.gap_size,
            passed: false,
        }
    }

    pub fn advance(&mut self, config: &SimConfig) {
        self.x -= config.scroll_speed;
    }

    /// Top edge of the top barrier
    pub fn top_barrier_y(&self, config: &SimConfig) -> f32 {
        self.gap_top - config.barrier_height as f32
    }

    pub fn right_edge(&self, config: &SimConfig) -> f32 {
        self.x + config.barrier_width as f32
    }

    pub fn off_screen(&self, config: &SimConfig) -> bool {
        self.right_edge(config) < 0.0
    }

    pub fn is_passed(&self) -> bool {
        self.passed
    }
}

/// The active obstacle set
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(config: &SimConfig, rng: &mut impl Rng) -> Self {
        Self {
            obstacles: vec![Obstacle::spawn(config.first_obstacle_x, config, rng)],
        }
    }

    /// Build a field from explicit obstacles (scripted courses)
    pub fn from_obstacles(obstacles: Vec<Obstacle>) -> Self {
        assert!(!obstacles.is_empty(), "an obstacle field cannot start empty");
        Self { obstacles }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Index of the obstacle the population should react to: the nearest
    /// one whose right edge the lead avatar has not passed yet. With a
    /// single obstacle this is always 0.
    pub fn active_index(&self, lead_x: f32, config: &SimConfig) -> usize {
        assert!(
            !self.obstacles.is_empty(),
            "obstacle field empty at active-index request"
        );
        self.obstacles
            .iter()
            .position(|o| lead_x <= o.right_edge(config))
            .unwrap_or(self.obstacles.len() - 1)
    }

    pub fn advance(&mut self, config: &SimConfig) {
        for obstacle in &mut self.obstacles {
            obstacle.advance(config);
        }
    }

    /// Post-collision scan: mark newly-passed obstacles, drop off-screen
    /// ones, and append one spawn per pass. Returns the number of passes
    /// (score increments) this tick. Removal happens after the scan, never
    /// mid-iteration.
    pub fn scan(&mut self, lead_x: Option<f32>, config: &SimConfig, rng: &mut impl Rng) -> u32 {
        let mut passes = 0;
        if let Some(lead_x) = lead_x {
            for obstacle in &mut self.obstacles {
                if !obstacle.passed && obstacle.x < lead_x {
                    obstacle.passed = true;
                    passes += 1;
                }
            }
        }

        self.obstacles.retain(|o| !o.off_screen(config));

        for _ in 0..passes {
            self.obstacles.push(Obstacle::spawn(config.spawn_x, config, rng));
        }
        if self.obstacles.is_empty() {
            self.obstacles.push(Obstacle::spawn(config.spawn_x, config, rng));
        }

        passes
    }
}

/// Two wrapping ground tiles. Purely cosmetic continuity state; the ground
/// line used for elimination lives in the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    pub y: f32,
    pub x1: f32,
    pub x2: f32,
}

impl Ground {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            y: config.ground_y,
            x1: 0.0,
            x2: config.ground_tile_width,
        }
    }

    pub fn advance(&mut self, config: &SimConfig) {
        let w = config.ground_tile_width;
        self.x1 -= config.scroll_speed;
        self.x2 -= config.scroll_speed;
        if self.x1 + w < 0.0 {
            self.x1 = self.x2 + w;
        }
        if self.x2 + w < 0.0 {
            self.x2 = self.x1 + w;
        }
    }
}
