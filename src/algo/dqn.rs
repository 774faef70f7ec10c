use std::path::{Path, PathBuf};

use burn::tensor::backend::AutodiffBackend;
use image::RgbImage;
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    approx::{self, QFunction},
    config::LearnerConfig,
    decay,
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy},
    memory::{ReplayMemory, Transition},
    preprocess::{FrameHistory, FramePreprocessor, StackedState},
    util,
};

/// A Deep Q network learner driven one game tick at a time
///
/// The environment calls [`step`](DeepQLearner::step) with every raw frame it renders. Only every
/// `action_repeat`th tick is a decision: the learner observes the reward accumulated since the last
/// decision, trains once burn-in is over, and picks a new action. The ticks in between repeat that action.
///
/// ### Generics
/// - `A`: An action of the game, the learner chooses among a fixed set of them
/// - `Q`: The [`QFunction`] being trained
pub struct DeepQLearner<A, Q = Box<dyn QFunction>> {
    actions: Vec<A>,
    net: Q,
    config: LearnerConfig,
    checkpoint_dir: PathBuf,
    memory: ReplayMemory,
    preprocessor: FramePreprocessor,
    history: FrameHistory,
    exploration: EpsilonGreedy<decay::Linear>,
    /// Tick on which burn-in completes and annealing begins
    anneal_start: u64,
    rng: StdRng,
    ticks: u64,
    accumulated_reward: f32,
}

impl<A: Clone> DeepQLearner<A> {
    /// Initialize a learner with the network variant selected by `config`, on burn backend `B`
    pub fn with_backend<B: AutodiffBackend>(
        actions: Vec<A>,
        config: LearnerConfig,
        device: &B::Device,
    ) -> Result<Self> {
        let net = approx::build::<B>(&config, actions.len(), device);
        Self::new(actions, net, config)
    }
}

impl<A: Clone, Q: QFunction> DeepQLearner<A, Q> {
    /// Initialize a new `DeepQLearner`
    ///
    /// ### Arguments
    /// - `actions` The actions the learner may choose from, must not be empty
    /// - `net` The [`QFunction`] to train, one output per action
    /// - `config` A [`LearnerConfig`], validated here
    ///
    /// Restores `net` from the configured checkpoint directory if `config.restore` is set, failing if
    /// that directory does not exist.
    pub fn new(actions: Vec<A>, mut net: Q, config: LearnerConfig) -> Result<Self> {
        config.validate()?;
        if actions.is_empty() {
            return Err(Error::Config("the action set must not be empty".into()));
        }

        let checkpoint_dir = PathBuf::from(&config.checkpoint_dir);
        if config.restore {
            if !checkpoint_dir.exists() {
                return Err(Error::MissingCheckpoint(checkpoint_dir));
            }
            net.restore(&checkpoint_dir)?;
            info!("restored network from {}", checkpoint_dir.display());
        }

        // One transition per decision tick, and burn-in never exceeds the capacity
        let anneal_start = config.action_repeat * config.burn_in_size;
        let schedule = decay::Linear::over(
            config.final_exploration_iteration.saturating_sub(anneal_start),
            config.exploration_start,
            config.exploration_end,
        )?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            actions,
            net,
            checkpoint_dir,
            memory: ReplayMemory::new(config.replay_capacity),
            preprocessor: FramePreprocessor::new(
                config.frame_height,
                config.frame_width,
                config.state_frames,
            ),
            history: FrameHistory::new(config.state_frames),
            exploration: EpsilonGreedy::new(schedule),
            anneal_start: anneal_start as u64,
            rng,
            ticks: 0,
            accumulated_reward: 0.0,
            config,
        })
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    pub fn net(&self) -> &Q {
        &self.net
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.checkpoint_dir
    }

    /// Number of ticks seen so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The current probability of taking a random action once burn-in is over
    pub fn exploration_rate(&self) -> f32 {
        self.exploration.epsilon()
    }

    /// Whether the replay memory is still too small to train from
    pub fn is_burning_in(&self) -> bool {
        self.memory.len() < self.config.burn_in_size
    }

    /// Advance the learner by one game tick
    ///
    /// ### Arguments
    /// - `frame` The raw screen capture of this tick
    /// - `reward` The reward the environment reports for the previous tick
    /// - `terminal` Whether the previous tick ended an episode
    ///
    /// **Returns** the actions to inject into the game, never empty
    pub fn step(&mut self, frame: &RgbImage, reward: f32, terminal: bool) -> Result<Vec<A>> {
        let iteration = self.ticks;
        self.ticks += 1;

        if iteration % self.config.logging_frequency as u64 == 0 {
            self.log_status(iteration);
        }

        // Between decisions, pretend this frame was not seen and keep doing the same thing.
        // The reward reported on a decision tick itself is not accumulated.
        if iteration % self.config.action_repeat as u64 != 0 {
            if let Some(action) = self.memory.newest().map(|t| t.action) {
                self.accumulated_reward += reward;
                self.history.push(frame.clone());
                return Ok(vec![self.actions[action].clone()]);
            }
        }

        if self.config.save && iteration % self.config.saving_frequency as u64 == 0 {
            self.net.save(&self.checkpoint_dir)?;
        }

        self.observe_reward(self.accumulated_reward);

        if !self.is_burning_in() {
            self.train()?;
        }

        let input = self.preprocess(frame);
        let action = self.select_action(&input, iteration);
        self.remember(input, action, terminal);

        self.history.push(frame.clone());
        self.accumulated_reward = 0.0;

        Ok(vec![self.actions[action].clone()])
    }

    /// Record `reward`, clipped to `[-1, 1]`, as the consequence of the newest transition
    ///
    /// Does nothing before the first transition exists.
    pub fn observe_reward(&mut self, reward: f32) {
        if let Some(transition) = self.memory.newest_mut() {
            transition.reward = Some(reward.clamp(-1.0, 1.0));
        }
    }

    /// The stacked network input for `frame`, built from the retained history
    pub fn preprocess(&self, frame: &RgbImage) -> StackedState {
        let cold_start = self.memory.is_empty();
        self.preprocessor.stack(frame, &self.history, cold_start)
    }

    /// Compute the regression targets for the transitions at the given memory positions
    ///
    /// A terminal transition, or the newest one, has no successor to bootstrap from and its target is
    /// just its reward. Any other target is `reward + discount * max Q(successor)`, evaluated with the
    /// network being trained.
    pub fn compute_targets(&self, positions: &[usize]) -> Result<Vec<f32>> {
        let mut targets = Vec::with_capacity(positions.len());
        let mut bootstrapped = Vec::new();

        for (ix, &position) in positions.iter().enumerate() {
            let transition = &self.memory[position];
            targets.push(transition.observed_reward()?);

            if !transition.terminal {
                if let Some(next) = self.memory.successor(position) {
                    bootstrapped.push((ix, &next.input));
                }
            }
        }

        let next_inputs = bootstrapped.iter().map(|&(_, s)| s).collect::<Vec<_>>();
        let next_values = self.net.infer_batch(&next_inputs);
        for ((ix, _), values) in bootstrapped.iter().zip(next_values) {
            targets[*ix] += self.config.discount * util::max(&values);
        }

        Ok(targets)
    }

    /// Perform one DQN learning step on a uniformly sampled batch
    fn train(&mut self) -> Result<()> {
        // Burn-in is validated to cover the batch size, so this only skips on a misconfigured memory
        let Some(positions) = self.memory.sample(self.config.batch_size, &mut self.rng) else {
            return Ok(());
        };

        let targets = self.compute_targets(&positions)?;
        let batch = positions.iter().map(|&p| &self.memory[p]).collect::<Vec<_>>();
        let inputs = batch.iter().map(|t| &t.input).collect::<Vec<_>>();
        let actions = batch.iter().map(|t| t.action).collect::<Vec<_>>();

        self.net.update(&inputs, &actions, &targets);
        Ok(())
    }

    /// Invoke the exploration policy, annealing it to `iteration` first unless burning in
    ///
    /// The rate falls linearly from its start value on the tick burn-in completes to its end value on
    /// `final_exploration_iteration`.
    fn select_action(&mut self, input: &StackedState, iteration: u64) -> usize {
        let choice = if self.is_burning_in() {
            Choice::Explore
        } else {
            let t = iteration.saturating_sub(self.anneal_start);
            self.exploration.anneal(t as f32);
            self.exploration.choose(&mut self.rng)
        };

        match choice {
            Choice::Explore => self.rng.gen_range(0..self.actions.len()),
            Choice::Exploit => util::argmax(&self.net.infer(input)),
        }
    }

    /// Store a new transition, its reward is observed on the next decision
    fn remember(&mut self, input: StackedState, action: usize, terminal: bool) {
        let seq = self.memory.next_seq();
        self.memory.push(Transition::new(seq, input, action, terminal));
    }

    fn log_status(&self, iteration: u64) {
        let burning_in = self.is_burning_in();
        let annealing = if burning_in {
            "not"
        } else if self.exploration_rate() > self.config.exploration_end {
            "still"
        } else {
            "done"
        };
        info!(
            "iteration {iteration} | replay {}/{} (burn in {}) | exploration rate {:.9} ({annealing} annealing)",
            self.memory.len(),
            self.memory.capacity(),
            if burning_in { "not done" } else { "done" },
            self.exploration_rate(),
        );

        if !burning_in {
            if let Some(newest) = self.memory.newest() {
                debug!("sample Q output: {:?}", self.net.infer(&newest.input));
            }
        }
    }
}
