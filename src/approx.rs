use std::path::Path;

use burn::tensor::backend::AutodiffBackend;
use log::info;

use crate::{config::LearnerConfig, error::Result, preprocess::StackedState};

pub mod model;
mod network;

pub use model::{Architecture, NetworkConfig, QNetwork};
pub use network::{with_adamw, DeepQNetwork};

/// The learner's view of its function approximator
///
/// Maps a stacked state to one value per action, and can be trained, saved and restored.
/// Calls are synchronous, the learner blocks on each of them.
pub trait QFunction {
    /// Predicted value of every action in `state`
    fn infer(&self, state: &StackedState) -> Vec<f32>;

    /// Predicted action values for several states at once
    fn infer_batch(&self, states: &[&StackedState]) -> Vec<Vec<f32>> {
        states.iter().map(|s| self.infer(s)).collect()
    }

    /// One regression step pulling the value of each taken action toward its target
    ///
    /// **Panics** if the slices differ in length
    fn update(&mut self, inputs: &[&StackedState], actions: &[usize], targets: &[f32]);

    /// Write a checkpoint to `path`
    fn save(&self, path: &Path) -> Result<()>;

    /// Replace the parameters with the checkpoint at `path`
    ///
    /// Fails with [`Error::MissingCheckpoint`](crate::Error::MissingCheckpoint) if `path` does not exist.
    fn restore(&mut self, path: &Path) -> Result<()>;
}

impl<Q: QFunction + ?Sized> QFunction for Box<Q> {
    fn infer(&self, state: &StackedState) -> Vec<f32> {
        (**self).infer(state)
    }

    fn infer_batch(&self, states: &[&StackedState]) -> Vec<Vec<f32>> {
        (**self).infer_batch(states)
    }

    fn update(&mut self, inputs: &[&StackedState], actions: &[usize], targets: &[f32]) {
        (**self).update(inputs, actions, targets)
    }

    fn save(&self, path: &Path) -> Result<()> {
        (**self).save(path)
    }

    fn restore(&mut self, path: &Path) -> Result<()> {
        (**self).restore(path)
    }
}

/// Build the network variant selected by the configuration's `pooling` and `dueling` flags
pub fn build<B: AutodiffBackend>(
    config: &LearnerConfig,
    num_actions: usize,
    device: &B::Device,
) -> Box<dyn QFunction> {
    let net = NetworkConfig::new(
        config.state_frames,
        config.frame_height,
        config.frame_width,
        num_actions,
    );
    let lr = config.learning_rate;
    let architecture = Architecture::from_flags(config.pooling, config.dueling);
    info!("building {architecture:?} network with {num_actions} outputs");

    match architecture {
        Architecture::Standard => Box::new(with_adamw(net.init_standard::<B>(device), lr, device)),
        Architecture::Pooled => Box::new(with_adamw(net.init_pooled::<B>(device), lr, device)),
        Architecture::Dueling => Box::new(with_adamw(net.init_dueling::<B>(device), lr, device)),
    }
}
