use burn::{
    nn::{conv::Conv2d, Linear, LinearConfig},
    prelude::*,
    tensor::{activation::relu, backend::AutodiffBackend},
};

use super::{flatten, NetworkConfig, QNetwork};

const HIDDEN: usize = 512;

/// Three convolutions followed by a fully connected hidden layer and a linear output per action
#[derive(Module, Debug)]
pub struct StandardNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    fc1: Linear<B>,
    fc2: Linear<B>,
}

impl NetworkConfig {
    pub fn init_standard<B: Backend>(&self, device: &B::Device) -> StandardNet<B> {
        let mut size = self.input_size();
        let conv1 = self.conv_layer(0, &mut size, device);
        let conv2 = self.conv_layer(1, &mut size, device);
        let conv3 = self.conv_layer(2, &mut size, device);
        let flat = self.conv_channels[2] * size.area();

        StandardNet {
            conv1,
            conv2,
            conv3,
            fc1: LinearConfig::new(flat, HIDDEN).init(device),
            fc2: LinearConfig::new(HIDDEN, self.num_actions).init(device),
        }
    }
}

impl<B: Backend> StandardNet<B> {
    fn features(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(input));
        let x = relu(self.conv2.forward(x));
        let x = relu(self.conv3.forward(x));
        flatten(x)
    }
}

impl<B: AutodiffBackend> QNetwork<B> for StandardNet<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(self.features(input)));
        self.fc2.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::{Autodiff, NdArray};

    use super::*;

    type B = Autodiff<NdArray>;

    #[test]
    fn output_per_action() {
        let device = Default::default();
        let net = NetworkConfig::new(4, 84, 84, 3).init_standard::<B>(&device);
        assert_eq!(net.fc1.weight.dims(), [7744, 512], "flattened size of an 84x84 input");

        let out = net.forward(Tensor::zeros([2, 4, 84, 84], &device));
        assert_eq!(out.dims(), [2, 3]);
    }

    #[test]
    fn non_square_frames() {
        let device = Default::default();
        let net = NetworkConfig::new(2, 30, 40, 5).init_standard::<B>(&device);
        let out = net.forward(Tensor::zeros([1, 2, 30, 40], &device));
        assert_eq!(out.dims(), [1, 5]);
    }
}
