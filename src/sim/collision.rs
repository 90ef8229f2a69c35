//! Avatar-versus-obstacle collision
//!
//! Exact silhouette overlap between the avatar and each barrier, offset by
//! the rounded relative position. The avatar uses one fixed representative
//! silhouette so collision stays independent of any animation timing. The
//! default silhouettes are solid rectangles of the configured sprite
//! dimensions: without pixel data that is the whole silhouette, and callers
//! with real sprite masks can supply them instead.

use super::avatar::Avatar;
use super::mask::SpriteMask;
use super::obstacle::Obstacle;
use crate::config::SimConfig;

/// The silhouettes used for every collision test in a world
#[derive(Debug, Clone)]
pub struct CollisionMasks {
    avatar: SpriteMask,
    /// Bottom barrier silhouette, as authored
    barrier_bottom: SpriteMask,
    /// Top barrier silhouette: the bottom one mirrored vertically
    barrier_top: SpriteMask,
}

impl CollisionMasks {
    /// Explicit silhouettes; the top barrier is derived by mirroring
    pub fn new(avatar: SpriteMask, barrier: SpriteMask) -> Self {
        let barrier_top = barrier.flipped_vertical();
        Self {
            avatar,
            barrier_bottom: barrier,
            barrier_top,
        }
    }

    /// Solid rectangles of the configured sprite dimensions
    pub fn solid(config: &SimConfig) -> Self {
        Self::new(
            SpriteMask::solid(config.avatar_width, config.avatar_height),
            SpriteMask::solid(config.barrier_width, config.barrier_height),
        )
    }

    /// True when the avatar's silhouette touches either barrier
    pub fn avatar_hits(&self, avatar: &Avatar, obstacle: &Obstacle, config: &SimConfig) -> bool {
        let ax = avatar.pos.x.round() as i32;
        let ay = avatar.pos.y.round() as i32;
        let dx = obstacle.x.round() as i32 - ax;
        let top_dy = obstacle.top_barrier_y(config).round() as i32 - ay;
        let bottom_dy = obstacle.gap_bottom.round() as i32 - ay;

        self.avatar.overlap(&self.barrier_top, (dx, top_dy)).is_some()
            || self
                .avatar
                .overlap(&self.barrier_bottom, (dx, bottom_dy))
                .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn avatar_at(y: f32, config: &SimConfig) -> Avatar {
        Avatar::new(0, Vec2::new(230.0, y), config)
    }

    #[test]
    fn avatar_inside_the_gap_is_safe() {
        let config = SimConfig::default();
        let masks = CollisionMasks::solid(&config);
        let obstacle = Obstacle::with_gap(230.0, 300.0, &config);
        // Gap spans 300..500; the avatar occupies 350..398.
        let avatar = avatar_at(350.0, &config);
        assert!(!masks.avatar_hits(&avatar, &obstacle, &config));
    }

    #[test]
    fn avatar_above_the_gap_hits_the_top_barrier() {
        let config = SimConfig::default();
        let masks = CollisionMasks::solid(&config);
        let obstacle = Obstacle::with_gap(230.0, 300.0, &config);
        let avatar = avatar_at(260.0, &config);
        assert!(masks.avatar_hits(&avatar, &obstacle, &config));
    }

    #[test]
    fn avatar_below_the_gap_hits_the_bottom_barrier() {
        let config = SimConfig::default();
        let masks = CollisionMasks::solid(&config);
        let obstacle = Obstacle::with_gap(230.0, 300.0, &config);
        let avatar = avatar_at(480.0, &config);
        assert!(masks.avatar_hits(&avatar, &obstacle, &config));
    }

    #[test]
    fn distant_obstacle_cannot_hit() {
        let config = SimConfig::default();
        let masks = CollisionMasks::solid(&config);
        let obstacle = Obstacle::with_gap(500.0, 300.0, &config);
        let avatar = avatar_at(260.0, &config);
        assert!(!masks.avatar_hits(&avatar, &obstacle, &config));
    }

    #[test]
    fn sparse_silhouette_is_more_permissive_than_solid() {
        let config = SimConfig::default();
        let solid = CollisionMasks::solid(&config);
        // Only the bottom-right pixel of the avatar sprite is opaque.
        let sparse = CollisionMasks::new(
            SpriteMask::from_fn(config.avatar_width, config.avatar_height, |x, y| {
                x == config.avatar_width - 1 && y == config.avatar_height - 1
            }),
            SpriteMask::solid(config.barrier_width, config.barrier_height),
        );
        let obstacle = Obstacle::with_gap(230.0, 300.0, &config);
        // Rows 260..308 graze the top barrier, but the single opaque pixel
        // sits at row 307, below the barrier's bottom edge at 300.
        let avatar = avatar_at(260.0, &config);
        assert!(solid.avatar_hits(&avatar, &obstacle, &config));
        assert!(!sparse.avatar_hits(&avatar, &obstacle, &config));
    }
}
