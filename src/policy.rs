//! Decision policies
//!
//! The simulation never learns anything itself: each avatar is steered by a
//! black-box [`DecisionPolicy`] supplied at world creation. The contract is
//! one synchronous call per avatar per tick; outputs above
//! [`FLAP_THRESHOLD`] mean "flap this tick".

use rand::Rng;

/// Outputs strictly above this value request a flap
pub const FLAP_THRESHOLD: f32 = 0.5;

/// What a policy sees each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Avatar vertical position
    pub y: f32,
    /// Absolute distance to the active obstacle's top gap edge
    pub gap_top_dist: f32,
    /// Absolute distance to the active obstacle's bottom gap edge
    pub gap_bottom_dist: f32,
}

impl Observation {
    pub fn as_array(self) -> [f32; 3] {
        [self.y, self.gap_top_dist, self.gap_bottom_dist]
    }
}

/// The control seam between the simulation and an external learner.
///
/// Non-finite outputs are treated as "no flap"; a panicking policy only
/// eliminates its own avatar. Implementations must not touch shared state.
pub trait DecisionPolicy {
    fn decide(&mut self, observation: Observation) -> f32;
}

impl<F> DecisionPolicy for F
where
    F: FnMut(Observation) -> f32,
{
    fn decide(&mut self, observation: Observation) -> f32 {
        self(observation)
    }
}

/// Hand-written reference policy: flap whenever the bottom gap edge is
/// closer than the top one, which holds the avatar near the middle of the
/// opening.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterSeekPolicy;

impl DecisionPolicy for CenterSeekPolicy {
    fn decide(&mut self, observation: Observation) -> f32 {
        if observation.gap_bottom_dist < observation.gap_top_dist {
            1.0
        } else {
            0.0
        }
    }
}

/// Single-unit policy with random weights; a stand-in for an externally
/// evolved network.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptronPolicy {
    pub weights: [f32; 3],
    pub bias: f32,
}

impl PerceptronPolicy {
    pub fn from_rng(rng: &mut impl Rng) -> Self {
        let mut weights = [0.0; 3];
        for w in &mut weights {
            *w = rng.random_range(-1.0..1.0);
        }
        Self {
            weights,
            bias: rng.random_range(-1.0..1.0),
        }
    }

    /// A copy with every weight nudged by up to `scale`
    pub fn jittered(&self, rng: &mut impl Rng, scale: f32) -> Self {
        let mut next = self.clone();
        for w in &mut next.weights {
            *w += rng.random_range(-scale..scale);
        }
        next.bias += rng.random_range(-scale..scale);
        next
    }
}

impl DecisionPolicy for PerceptronPolicy {
    fn decide(&mut self, observation: Observation) -> f32 {
        let inputs = observation.as_array();
        let mut z = self.bias;
        // Inputs are in pixels; scale them so the sigmoid stays responsive.
        for (w, x) in self.weights.iter().zip(inputs) {
            z += w * x * 0.01;
        }
        1.0 / (1.0 + (-z).exp())
    }
}
