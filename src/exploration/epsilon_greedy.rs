use rand::Rng;

use crate::{assert_interval, decay::Decay};

use super::Choice;

/// Epsilon greedy exploration policy whose epsilon is annealed on demand
///
/// The current epsilon is held as state rather than recomputed on every choice, so the owner decides
/// when annealing happens (e.g. not at all while burning in).
pub struct EpsilonGreedy<D: Decay> {
    schedule: D,
    epsilon: f32,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay schedule, starting at its value for `t = 0`
    ///
    /// **Panics** if the schedule does not start in the interval `[0,1]`
    pub fn new(schedule: D) -> Self {
        let epsilon = schedule.evaluate(0.0);
        assert_interval!(epsilon, 0.0, 1.0);
        Self { schedule, epsilon }
    }

    /// The current probability of exploring
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Move epsilon to the schedule's value at time `t`
    ///
    /// Epsilon never increases, even if the schedule would allow it.
    pub fn anneal(&mut self, t: f32) -> f32 {
        self.epsilon = self.epsilon.min(self.schedule.evaluate(t));
        self.epsilon
    }

    /// Invoke the policy at the current epsilon
    pub fn choose(&self, rng: &mut impl Rng) -> Choice {
        if rng.gen::<f32>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}
