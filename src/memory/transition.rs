use crate::{
    error::{Error, Result},
    preprocess::StackedState,
};

/// A single decision of the learner, as stored in replay memory
#[derive(Debug, Clone)]
pub struct Transition {
    /// Position in the replay history at creation time, counting every transition ever stored
    pub seq: u64,
    /// The network input the decision was made from
    pub input: StackedState,
    /// Index of the chosen action in the learner's action set
    pub action: usize,
    /// Whether the environment reported a terminal state on the decision tick
    pub terminal: bool,
    /// The clipped reward that followed the action, unknown until the next decision tick
    pub reward: Option<f32>,
}

impl Transition {
    pub fn new(seq: u64, input: StackedState, action: usize, terminal: bool) -> Self {
        Self {
            seq,
            input,
            action,
            terminal,
            reward: None,
        }
    }

    /// The observed reward, or an error if it has not been observed yet
    pub fn observed_reward(&self) -> Result<f32> {
        self.reward.ok_or(Error::UnobservedReward { seq: self.seq })
    }
}
