use image::RgbImage;
use log::debug;

use crate::{algo::dqn::DeepQLearner, approx::QFunction, error::Result};

/// A game the learner plays through its screen, its score and its input
///
/// The game advances in discrete ticks. Each tick the [`Player`] captures the screen, asks for the
/// feedback on the previous tick, and injects the actions the learner chose.
pub trait Environment {
    /// An input the game understands, e.g. a key press
    type Action: Clone;

    /// Capture the current screen
    fn frame(&mut self) -> RgbImage;

    /// Reward for the previous tick and whether it ended an episode
    fn feedback(&mut self) -> (f32, bool);

    /// Apply `actions` and advance the game by one tick
    fn inject(&mut self, actions: &[Self::Action]);
}

/// Turns a two-player score board into per-tick feedback
///
/// The reward is the change in the player's own score minus the change in the opponent's since
/// the last observation, and any nonzero reward ends an episode.
#[derive(Debug, Clone, Default)]
pub struct ScoreFeedback {
    own: f32,
    opponent: f32,
}

impl ScoreFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// **Returns** `(reward, terminal)` for the scores reached now
    pub fn observe(&mut self, own: f32, opponent: f32) -> (f32, bool) {
        let reward = (own - self.own) - (opponent - self.opponent);
        self.own = own;
        self.opponent = opponent;
        (reward, reward != 0.0)
    }
}

/// Drives a [`DeepQLearner`] against an [`Environment`], one tick at a time
pub struct Player<E: Environment, Q = Box<dyn QFunction>> {
    env: E,
    learner: DeepQLearner<E::Action, Q>,
}

impl<E: Environment, Q: QFunction> Player<E, Q> {
    pub fn new(env: E, learner: DeepQLearner<E::Action, Q>) -> Self {
        Self { env, learner }
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn learner(&self) -> &DeepQLearner<E::Action, Q> {
        &self.learner
    }

    /// Play one tick, blocking until the learner has chosen
    pub fn tick(&mut self) -> Result<()> {
        let frame = self.env.frame();
        let (reward, terminal) = self.env.feedback();
        if terminal {
            debug!("episode ended at tick {} with reward {reward}", self.learner.ticks());
        }

        let actions = self.learner.step(&frame, reward, terminal)?;
        self.env.inject(&actions);
        Ok(())
    }

    /// Play `ticks` ticks
    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    pub fn into_parts(self) -> (E, DeepQLearner<E::Action, Q>) {
        (self.env, self.learner)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use image::Rgb;

    use super::*;
    use crate::{config::LearnerConfig, preprocess::StackedState};

    struct ConstNet;

    impl QFunction for ConstNet {
        fn infer(&self, _state: &StackedState) -> Vec<f32> {
            vec![0.0, 1.0]
        }

        fn update(&mut self, _inputs: &[&StackedState], _actions: &[usize], _targets: &[f32]) {}

        fn save(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn restore(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    /// Scores a point for the player every fifth tick
    #[derive(Default)]
    struct Counter {
        tick: u32,
        feedback: ScoreFeedback,
        injected: Vec<Vec<bool>>,
    }

    impl Environment for Counter {
        type Action = bool;

        fn frame(&mut self) -> RgbImage {
            RgbImage::from_pixel(4, 4, Rgb([self.tick as u8, 0, 0]))
        }

        fn feedback(&mut self) -> (f32, bool) {
            self.feedback.observe((self.tick / 5) as f32, 0.0)
        }

        fn inject(&mut self, actions: &[bool]) {
            self.injected.push(actions.to_vec());
            self.tick += 1;
        }
    }

    #[test]
    fn score_feedback() {
        let mut feedback = ScoreFeedback::new();
        assert_eq!(feedback.observe(0.0, 0.0), (0.0, false));
        assert_eq!(feedback.observe(1.0, 0.0), (1.0, true), "own point");
        assert_eq!(feedback.observe(1.0, 0.0), (0.0, false), "deltas, not totals");
        assert_eq!(feedback.observe(1.0, 1.0), (-1.0, true), "opponent point");
        assert_eq!(feedback.observe(2.0, 2.0), (0.0, false), "both scoring cancels out");
    }

    #[test]
    fn player_drives_one_step_per_tick() {
        let config = LearnerConfig::new()
            .with_frame_height(4)
            .with_frame_width(4)
            .with_state_frames(2)
            .with_replay_capacity(8)
            .with_burn_in_size(2)
            .with_batch_size(2)
            .with_action_repeat(2)
            .with_exploration_start(0.0)
            .with_exploration_end(0.0)
            .with_save(false)
            .with_seed(Some(7));
        let learner = DeepQLearner::new(vec![false, true], ConstNet, config).unwrap();
        let mut player = Player::new(Counter::default(), learner);

        player.run(12).unwrap();
        assert_eq!(player.learner().ticks(), 12);
        assert_eq!(player.learner().memory().len(), 6);

        let (env, _) = player.into_parts();
        assert_eq!(env.injected.len(), 12, "one injection per tick");
        assert!(env.injected.iter().all(|a| a.len() == 1));
        assert!(
            env.injected[4..].iter().all(|a| a[0]),
            "exploits the best action once burn-in is over"
        );
    }
}
