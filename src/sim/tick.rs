//! One simulation tick
//!
//! Fixed per-tick order: active obstacle selection, decisions and motion,
//! ground scroll, obstacle scroll plus collision, field scan (score, pass
//! bonus, spawn), bounds eliminations, phase transition. Each tick is fully
//! deterministic given the previous state and the policy outputs; the only
//! randomness is the gap draw at obstacle creation.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::state::{EliminationCause, Phase, World};
use crate::policy::{FLAP_THRESHOLD, Observation};

/// What happened during one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Score increments this tick
    pub passes: u32,
    /// Ids eliminated by collision
    pub collisions: Vec<u32>,
    /// Ids eliminated by the vertical bounds predicate
    pub out_of_bounds: Vec<u32>,
    /// Ids eliminated because their policy panicked
    pub policy_faults: Vec<u32>,
    /// Phase after the tick
    pub phase: Phase,
}

impl TickReport {
    fn empty(phase: Phase) -> Self {
        Self {
            passes: 0,
            collisions: Vec::new(),
            out_of_bounds: Vec::new(),
            policy_faults: Vec::new(),
            phase,
        }
    }
}

/// Advance the world by one tick
pub fn tick(world: &mut World) -> TickReport {
    let mut report = TickReport::empty(world.phase);
    if world.phase == Phase::AllEliminated {
        return report;
    }

    let survival_bonus = world.config.survival_bonus;
    let collision_penalty = world.config.collision_penalty;
    let pass_bonus = world.config.pass_bonus;

    world.ticks += 1;

    // 1. Active obstacle for this tick's observations.
    let Some(lead_x) = world.population.lead_x() else {
        world.phase = Phase::AllEliminated;
        report.phase = world.phase;
        return report;
    };
    let active = world.field.active_index(lead_x, &world.config);
    let (gap_top, gap_bottom) = {
        let obstacle = &world.field.obstacles()[active];
        (obstacle.gap_top, obstacle.gap_bottom)
    };

    // 2. Decisions and motion. Policies run one at a time; a panic only
    // takes out its own avatar.
    let mut faulted: Vec<usize> = Vec::new();
    for slot in 0..world.population.living() {
        let observation = {
            let avatar = world.population.avatar(slot);
            Observation {
                y: avatar.pos.y,
                gap_top_dist: (avatar.pos.y - gap_top).abs(),
                gap_bottom_dist: (avatar.pos.y - gap_bottom).abs(),
            }
        };
        let output = catch_unwind(AssertUnwindSafe(|| {
            world.population.policy_mut(slot).decide(observation)
        }));
        match output {
            Ok(value) => {
                world.population.add_fitness(slot, survival_bonus);
                if value.is_finite() && value > FLAP_THRESHOLD {
                    world.population.avatar_mut(slot).flap(&world.config);
                } else {
                    world.population.avatar_mut(slot).advance(&world.config);
                }
            }
            Err(_) => faulted.push(slot),
        }
    }
    for &slot in faulted.iter().rev() {
        let id = world.population.avatar(slot).id;
        log::warn!("policy for avatar {id} panicked, eliminating it");
        report.policy_faults.push(id);
        world
            .population
            .eliminate(slot, world.ticks, EliminationCause::PolicyFault);
    }

    // 3. Ground scroll.
    world.ground.advance(&world.config);

    // 4. Obstacle scroll and collision. Collect first, remove after the
    // scan so the arena never shifts mid-iteration.
    world.field.advance(&world.config);
    let mut collided: Vec<usize> = Vec::new();
    for obstacle in world.field.obstacles() {
        for slot in 0..world.population.living() {
            if collided.contains(&slot) {
                continue;
            }
            if world
                .masks
                .avatar_hits(world.population.avatar(slot), obstacle, &world.config)
            {
                collided.push(slot);
            }
        }
    }
    collided.sort_unstable();
    for &slot in collided.iter().rev() {
        let id = world.population.avatar(slot).id;
        report.collisions.push(id);
        world.population.add_fitness(slot, -collision_penalty);
        world
            .population
            .eliminate(slot, world.ticks, EliminationCause::Collision);
    }

    // 5. Field scan: score, pass bonus, spawn, recycle.
    let lead_x = world.population.lead_x();
    let passes = world.field.scan(lead_x, &world.config, &mut world.rng);
    if passes > 0 {
        world.score += passes;
        for slot in 0..world.population.living() {
            world.population.add_fitness(slot, pass_bonus * passes as f32);
        }
        log::debug!(
            "score {} at tick {} ({} living)",
            world.score,
            world.ticks,
            world.population.living()
        );
    }
    report.passes = passes;

    // 6. Vertical bounds.
    let out: Vec<usize> = (0..world.population.living())
        .filter(|&slot| world.population.avatar(slot).out_of_bounds(&world.config))
        .collect();
    for &slot in out.iter().rev() {
        let id = world.population.avatar(slot).id;
        report.out_of_bounds.push(id);
        world
            .population
            .eliminate(slot, world.ticks, EliminationCause::OutOfBounds);
    }

    // 7. Phase transition.
    if world.population.living() == 0 {
        world.phase = Phase::AllEliminated;
        log::info!("all avatars eliminated at tick {}", world.ticks);
    }
    report.phase = world.phase;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec2;

    use crate::config::SimConfig;
    use crate::policy::DecisionPolicy;
    use crate::sim::avatar::Avatar;
    use crate::sim::obstacle::{Obstacle, ObstacleField};

    fn never_flap() -> Box<dyn DecisionPolicy> {
        Box::new(|_: Observation| -> f32 { 0.0 })
    }

    fn always_flap() -> Box<dyn DecisionPolicy> {
        Box::new(|_: Observation| -> f32 { 1.0 })
    }

    /// Config whose gap draw always covers the whole play area, so nothing
    /// ever collides.
    fn open_course() -> SimConfig {
        SimConfig {
            gap_min: 0,
            gap_max: 1,
            gap_size: 700.0,
            ..Default::default()
        }
    }

    #[test]
    fn ground_elimination_fires_exactly_on_time() {
        let config = SimConfig::default();

        // Predict the elimination tick from the physics law alone.
        let mut reference = Avatar::new(0, config.avatar_start, &config);
        let mut expected_tick = 0u64;
        while !reference.out_of_bounds(&config) {
            reference.advance(&config);
            expected_tick += 1;
        }

        let mut world = crate::sim::World::new(config, 3, vec![never_flap()]).unwrap();
        for tick_index in 1..expected_tick {
            let report = tick(&mut world);
            assert_eq!(report.phase, Phase::Running, "died early at {tick_index}");
        }
        let report = tick(&mut world);
        assert_eq!(report.out_of_bounds, vec![0]);
        assert_eq!(report.phase, Phase::AllEliminated);
        assert_eq!(world.ticks, expected_tick);
    }

    #[test]
    fn constant_flapper_escapes_through_the_ceiling() {
        // Alternate flap/advance so the avatar climbs: a flap alone does
        // not move, the following advance does.
        let mut climb = false;
        let policy = Box::new(move |_: Observation| -> f32 {
            climb = !climb;
            if climb { 1.0 } else { 0.0 }
        }) as Box<dyn DecisionPolicy>;

        let mut world = crate::sim::World::new(open_course(), 3, vec![policy]).unwrap();
        let mut cause = None;
        for _ in 0..400 {
            let report = tick(&mut world);
            if report.phase == Phase::AllEliminated {
                cause = world.population.retired()[0].cause;
                break;
            }
        }
        assert_eq!(cause, Some(crate::sim::EliminationCause::OutOfBounds));
        assert!(world.population.retired()[0].fitness > 0.0);
    }

    #[test]
    fn collision_eliminates_and_penalizes() {
        let config = SimConfig::default();
        let mut world = crate::sim::World::new(config.clone(), 3, vec![never_flap()]).unwrap();
        // A wall right on top of the avatar: gap far below, top barrier
        // covering the spawn height.
        world.field =
            ObstacleField::from_obstacles(vec![Obstacle::with_gap(230.0, 500.0, &config)]);

        let report = tick(&mut world);
        assert_eq!(report.collisions, vec![0]);
        assert_eq!(report.phase, Phase::AllEliminated);

        let retired = &world.population.retired()[0];
        assert_eq!(retired.cause, Some(crate::sim::EliminationCause::Collision));
        assert_relative_eq!(
            retired.fitness,
            config.survival_bonus - config.collision_penalty
        );
    }

    #[test]
    fn score_matches_one_shot_pass_transitions() {
        let mut world = crate::sim::World::new(open_course(), 9, vec![always_flap()]).unwrap();
        let mut total_passes = 0;
        for _ in 0..500 {
            let report = tick(&mut world);
            assert!(report.passes <= 1);
            total_passes += report.passes;
        }
        assert!(total_passes >= 2);
        assert_eq!(world.score, total_passes);
        assert!(!world.field.obstacles().is_empty());
    }

    #[test]
    fn pass_and_survival_bonuses_accumulate() {
        let config = open_course();
        let mut world = crate::sim::World::new(config.clone(), 9, vec![always_flap()]).unwrap();
        for _ in 0..100 {
            tick(&mut world);
        }
        // First pass happens when 700 - 5t < 230, i.e. tick 95.
        assert_eq!(world.score, 1);
        let expected = 100.0 * config.survival_bonus + config.pass_bonus;
        assert_relative_eq!(world.population.fitness_of(0), expected, epsilon = 1e-3);
    }

    #[test]
    fn panicking_policy_only_takes_out_its_own_avatar() {
        let panicker = Box::new(|_: Observation| -> f32 { panic!("policy exploded") })
            as Box<dyn DecisionPolicy>;
        let mut world =
            crate::sim::World::new(open_course(), 5, vec![panicker, always_flap()]).unwrap();

        let report = tick(&mut world);
        assert_eq!(report.policy_faults, vec![0]);
        assert_eq!(report.phase, Phase::Running);
        assert_eq!(world.population.living(), 1);

        let retired = &world.population.retired()[0];
        assert_eq!(retired.cause, Some(crate::sim::EliminationCause::PolicyFault));
        assert_eq!(retired.fitness, 0.0);
    }

    #[test]
    fn malformed_output_means_no_flap() {
        let nan_policy = Box::new(|_: Observation| f32::NAN) as Box<dyn DecisionPolicy>;
        let mut world = crate::sim::World::new(open_course(), 5, vec![nan_policy]).unwrap();
        let start_y = world.population.avatar(0).pos.y;
        tick(&mut world);
        // The avatar fell (advance), instead of flapping or crashing.
        assert!(world.population.avatar(0).pos.y > start_y);
    }

    #[test]
    fn identical_seeds_tick_identically() {
        let build = || {
            crate::sim::World::new(
                SimConfig::default(),
                1234,
                vec![never_flap(), always_flap()],
            )
            .unwrap()
        };
        let mut a = build();
        let mut b = build();
        for _ in 0..300 {
            tick(&mut a);
            tick(&mut b);
            assert_eq!(a.ticks, b.ticks);
            assert_eq!(a.score, b.score);
            assert_eq!(a.population.living(), b.population.living());
        }
        for (ra, rb) in a
            .population
            .results()
            .iter()
            .zip(b.population.results().iter())
        {
            assert_eq!(ra.fitness.to_bits(), rb.fitness.to_bits());
            assert_eq!(ra.eliminated_at, rb.eliminated_at);
        }
    }

    #[test]
    fn living_set_never_grows() {
        let policies: Vec<Box<dyn DecisionPolicy>> = vec![
            never_flap(),
            always_flap(),
            Box::new(|obs: Observation| -> f32 { if obs.y > 400.0 { 1.0 } else { 0.0 } }),
        ];
        let mut world = crate::sim::World::new(SimConfig::default(), 77, policies).unwrap();
        let mut previous = world.population.living();
        for _ in 0..600 {
            tick(&mut world);
            let living = world.population.living();
            assert!(living <= previous);
            previous = living;
            if world.phase == Phase::AllEliminated {
                break;
            }
        }
    }

    #[test]
    fn terminal_phase_is_inert() {
        let mut world = crate::sim::World::new(SimConfig::default(), 5, vec![]).unwrap();
        let report = tick(&mut world);
        assert_eq!(report.phase, Phase::AllEliminated);
        let ticks = world.ticks;
        tick(&mut world);
        assert_eq!(world.ticks, ticks);
    }

    #[test]
    fn avatars_start_where_configured() {
        let config = SimConfig {
            avatar_start: Vec2::new(100.0, 200.0),
            ..Default::default()
        };
        let world = crate::sim::World::new(config, 5, vec![never_flap()]).unwrap();
        assert_eq!(world.population.avatar(0).pos, Vec2::new(100.0, 200.0));
    }
}
