use std::path::Path;

use burn::{
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    record::{DefaultFileRecorder, FullPrecisionSettings},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use log::{debug, log_enabled, trace, Level};
use nn::loss::{MseLoss, Reduction};

use super::{model::QNetwork, QFunction};
use crate::{
    error::{Error, Result},
    preprocess::StackedState,
    traits::ToTensor,
};

/// Name of the model record inside a checkpoint directory, the recorder adds the extension
const MODEL_FILE: &str = "model";

/// A [`QFunction`] backed by a burn [`QNetwork`]
///
/// ### Generics
/// - `B`: A burn autodiff backend
/// - `M`: The network being trained
/// - `O`: An [`Optimizer`] for `M`
pub struct DeepQNetwork<B, M, O>
where
    B: AutodiffBackend,
{
    model: M,
    optimizer: O,
    loss: MseLoss<B>,
    lr: f64,
    device: B::Device,
}

/// A [`DeepQNetwork`] training `model` with a default AdamW optimizer
pub fn with_adamw<B, M>(
    model: M,
    lr: f64,
    device: &B::Device,
) -> DeepQNetwork<B, M, impl Optimizer<M, B>>
where
    B: AutodiffBackend,
    M: QNetwork<B>,
{
    DeepQNetwork::new(model, AdamWConfig::new().init(), lr, device)
}

impl<B, M, O> DeepQNetwork<B, M, O>
where
    B: AutodiffBackend,
    M: QNetwork<B>,
    O: Optimizer<M, B>,
{
    pub fn new(model: M, optimizer: O, lr: f64, device: &B::Device) -> Self {
        Self {
            model,
            optimizer,
            loss: MseLoss::new(),
            lr,
            device: device.clone(),
        }
    }

    fn recorder() -> DefaultFileRecorder<FullPrecisionSettings> {
        DefaultFileRecorder::<FullPrecisionSettings>::default()
    }
}

impl<B, M, O> QFunction for DeepQNetwork<B, M, O>
where
    B: AutodiffBackend,
    M: QNetwork<B>,
    O: Optimizer<M, B>,
{
    fn infer(&self, state: &StackedState) -> Vec<f32> {
        self.infer_batch(&[state]).pop().unwrap_or_default()
    }

    fn infer_batch(&self, states: &[&StackedState]) -> Vec<Vec<f32>> {
        if states.is_empty() {
            return Vec::new();
        }

        let output = self.model.forward(states.to_tensor(&self.device));
        let [_, num_actions] = output.dims();
        let values = output.into_data().convert::<f32>().value;
        values.chunks(num_actions).map(<[f32]>::to_vec).collect()
    }

    fn update(&mut self, inputs: &[&StackedState], actions: &[usize], targets: &[f32]) {
        assert!(
            inputs.len() == actions.len() && actions.len() == targets.len(),
            "`inputs`, `actions` and `targets` are the same length"
        );
        if inputs.is_empty() {
            return;
        }

        let states = inputs.to_tensor(&self.device);
        let actions: Tensor<B, 2, Int> = actions.to_tensor(&self.device);
        let targets: Tensor<B, 2> = targets.to_tensor(&self.device);

        let model = self.model.clone();

        // Only the taken action's value is regressed toward its target
        let q_values = model.forward(states).gather(1, actions);
        let loss = self.loss.forward(q_values, targets, Reduction::Mean);
        if log_enabled!(Level::Trace) {
            trace!("loss {:.6}", loss.clone().into_scalar().elem::<f32>());
        }

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        self.model = self.optimizer.step(self.lr, model, grads);
    }

    fn save(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;
        self.model
            .clone()
            .save_file(path.join(MODEL_FILE), &Self::recorder())
            .map_err(|err| Error::Checkpoint(format!("{err:?}")))?;
        debug!("saved network to {}", path.display());
        Ok(())
    }

    fn restore(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::MissingCheckpoint(path.to_path_buf()));
        }

        self.model = self
            .model
            .clone()
            .load_file(path.join(MODEL_FILE), &Self::recorder(), &self.device)
            .map_err(|err| Error::Checkpoint(format!("{err:?}")))?;
        debug!("restored network from {}", path.display());
        Ok(())
    }
}
