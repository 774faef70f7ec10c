use burn::{
    prelude::*,
    tensor::{BasicOps, Shape},
};

use crate::preprocess::StackedState;

/// A trait for converting items to tensors
///
/// Implemented for batches of learner data so they can be fed to a burn model
pub trait ToTensor<B: Backend, const D: usize, K: BasicOps<B>> {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, D, K>;
}

/// A batch of stacked states as `[batch, frames, height, width]`
impl<B: Backend> ToTensor<B, 4, Float> for &[&StackedState] {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 4> {
        let [frames, height, width] = self.first().map_or([0; 3], |s| s.dims());
        let data = self
            .iter()
            .flat_map(|s| s.as_slice().iter().copied())
            .collect::<Vec<f32>>();
        let shape = Shape::new([self.len(), frames, height, width]);
        Tensor::from_data(Data::new(data, shape).convert(), device)
    }
}

/// Action indices as a `[batch, 1]` column, ready for `gather`
impl<B: Backend> ToTensor<B, 2, Int> for &[usize] {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 2, Int> {
        let data = self.iter().map(|&a| a as i64).collect::<Vec<_>>();
        let shape = Shape::new([self.len(), 1]);
        Tensor::from_data(Data::new(data, shape).convert(), device)
    }
}

/// Scalars as a `[batch, 1]` column
impl<B: Backend> ToTensor<B, 2, Float> for &[f32] {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 2> {
        let shape = Shape::new([self.len(), 1]);
        Tensor::from_data(Data::new(self.to_vec(), shape).convert(), device)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;
    use crate::preprocess::{tests::solid, FrameHistory, FramePreprocessor};

    type B = NdArray;

    #[test]
    fn stacked_states_to_tensor() {
        let pre = FramePreprocessor::new(3, 5, 2);
        let history = FrameHistory::new(2);
        let a = pre.stack(&solid(5, 3, [255, 0, 0]), &history, true);
        let b = pre.stack(&solid(5, 3, [0, 0, 0]), &history, true);

        let tensor: Tensor<B, 4> = [&a, &b].as_slice().to_tensor(&Default::default());
        assert_eq!(tensor.dims(), [2, 2, 3, 5]);

        let values = tensor.into_data().convert::<f32>().value;
        assert!(values[..30].iter().all(|&v| v == 1.0), "first sample first");
        assert!(values[30..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn actions_to_column() {
        let tensor: Tensor<B, 2, Int> = [2usize, 0, 1].as_slice().to_tensor(&Default::default());
        assert_eq!(tensor.dims(), [3, 1]);
        assert_eq!(tensor.into_data().convert::<i64>().value, [2, 0, 1]);
    }
}
