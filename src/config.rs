use burn::config::Config;

use crate::error::{self, Error};

/// Hyperparameters for a [`DeepQLearner`](crate::algo::dqn::DeepQLearner) and the network it trains
///
/// Every option has a default, so `LearnerConfig::new()` yields the standard Atari-style setup.
/// Being a burn [`Config`], it can also be written to and read from JSON with `save` and `load`.
#[derive(Config, Debug)]
pub struct LearnerConfig {
    /// Height of a preprocessed frame
    #[config(default = 84)]
    pub frame_height: usize,
    /// Width of a preprocessed frame
    #[config(default = 84)]
    pub frame_width: usize,
    /// Number of frames stacked into one network input
    #[config(default = 4)]
    pub state_frames: usize,
    /// Maximum number of transitions kept in replay memory
    #[config(default = 50000)]
    pub replay_capacity: usize,
    /// Number of transitions to collect before any training happens
    #[config(default = 5000)]
    pub burn_in_size: usize,
    /// Number of transitions sampled per training update
    #[config(default = 32)]
    pub batch_size: usize,
    /// The discount factor
    #[config(default = 0.99)]
    pub discount: f32,
    /// Exploration rate during burn-in and at the start of annealing
    #[config(default = 1.0)]
    pub exploration_start: f32,
    /// Exploration rate once annealing is done
    #[config(default = 0.1)]
    pub exploration_end: f32,
    /// Tick at which the exploration rate reaches its end value, annealing starts when burn-in ends
    #[config(default = 1000000)]
    pub final_exploration_iteration: usize,
    /// Number of ticks each decided action is held for
    #[config(default = 4)]
    pub action_repeat: usize,
    /// Log a status block every this many ticks
    #[config(default = 100)]
    pub logging_frequency: usize,
    /// Save a checkpoint every this many ticks
    #[config(default = 10000)]
    pub saving_frequency: usize,
    /// Use the max-pooling network variant
    #[config(default = false)]
    pub pooling: bool,
    /// Use the dueling value/advantage network variant
    #[config(default = false)]
    pub dueling: bool,
    /// The learning rate for the optimizer
    #[config(default = 1e-4)]
    pub learning_rate: f64,
    /// Directory checkpoints are written to and restored from
    #[config(default = "String::from(\"deep_q_model\")")]
    pub checkpoint_dir: String,
    /// Whether to periodically save checkpoints
    #[config(default = true)]
    pub save: bool,
    /// Whether to restore the network from `checkpoint_dir` at construction
    #[config(default = false)]
    pub restore: bool,
    /// Seed for exploration and replay sampling, drawn from entropy if unset
    pub seed: Option<u64>,
}

impl LearnerConfig {
    /// Check the invariants the learning loop relies on
    ///
    /// Notably, sampling a batch requires at least `batch_size` transitions, so burn-in must cover it.
    pub fn validate(&self) -> error::Result<()> {
        let positive = [
            ("frame_height", self.frame_height),
            ("frame_width", self.frame_width),
            ("state_frames", self.state_frames),
            ("replay_capacity", self.replay_capacity),
            ("batch_size", self.batch_size),
            ("action_repeat", self.action_repeat),
            ("logging_frequency", self.logging_frequency),
            ("saving_frequency", self.saving_frequency),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(Error::Config(format!("`{name}` must be greater than zero")));
        }

        if self.burn_in_size < self.batch_size {
            return Err(Error::Config(format!(
                "`burn_in_size` ({}) must be at least `batch_size` ({})",
                self.burn_in_size, self.batch_size
            )));
        }
        if self.burn_in_size > self.replay_capacity {
            return Err(Error::Config(format!(
                "`burn_in_size` ({}) can never be reached with `replay_capacity` ({})",
                self.burn_in_size, self.replay_capacity
            )));
        }

        for (name, value) in [
            ("exploration_start", self.exploration_start),
            ("exploration_end", self.exploration_end),
            ("discount", self.discount),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "`{name}` must be in the interval [0, 1], got {value}"
                )));
            }
        }
        if self.exploration_start < self.exploration_end {
            return Err(Error::Config(
                "`exploration_start` must not be less than `exploration_end`".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LearnerConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_height, 84);
        assert_eq!(config.state_frames, 4);
        assert_eq!(config.checkpoint_dir, "deep_q_model");
        assert!(config.seed.is_none());
    }

    #[test]
    fn burn_in_must_cover_batch() {
        let config = LearnerConfig::new().with_batch_size(64).with_burn_in_size(10);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn burn_in_must_fit_in_memory() {
        let config = LearnerConfig::new()
            .with_replay_capacity(10)
            .with_burn_in_size(20)
            .with_batch_size(2);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_zero_and_out_of_range_values() {
        let zero_repeat = LearnerConfig::new().with_action_repeat(0);
        assert!(zero_repeat.validate().is_err(), "zero action repeat rejected");

        let bad_rate = LearnerConfig::new().with_exploration_start(1.5);
        assert!(bad_rate.validate().is_err(), "rate above one rejected");

        let inverted = LearnerConfig::new()
            .with_exploration_start(0.1)
            .with_exploration_end(0.5);
        assert!(inverted.validate().is_err(), "increasing schedule rejected");
    }

    #[test]
    fn json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learner.json");
        let config = LearnerConfig::new().with_dueling(true).with_seed(Some(7));
        config.save(&path).unwrap();

        let loaded = LearnerConfig::load(&path).unwrap();
        assert!(loaded.dueling);
        assert_eq!(loaded.seed, Some(7));
    }
}
