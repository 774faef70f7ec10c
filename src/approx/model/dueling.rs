use burn::{
    nn::{conv::Conv2d, Linear, LinearConfig},
    prelude::*,
    tensor::{activation::relu, backend::AutodiffBackend},
};

use super::{flatten, NetworkConfig, QNetwork};

const HIDDEN: usize = 512;

/// Dueling architecture: the convolutional features feed a value stream and an advantage stream
///
/// Q(s, a) = A(s, a) - max<sub>a'</sub> A(s, a') + V(s)
#[derive(Module, Debug)]
pub struct DuelingNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    value_hidden: Linear<B>,
    advantage_hidden: Linear<B>,
    value: Linear<B>,
    advantage: Linear<B>,
}

impl NetworkConfig {
    pub fn init_dueling<B: Backend>(&self, device: &B::Device) -> DuelingNet<B> {
        let mut size = self.input_size();
        let conv1 = self.conv_layer(0, &mut size, device);
        let conv2 = self.conv_layer(1, &mut size, device);
        let conv3 = self.conv_layer(2, &mut size, device);
        let flat = self.conv_channels[2] * size.area();

        DuelingNet {
            conv1,
            conv2,
            conv3,
            value_hidden: LinearConfig::new(flat, HIDDEN).init(device),
            advantage_hidden: LinearConfig::new(flat, HIDDEN).init(device),
            value: LinearConfig::new(HIDDEN, 1).init(device),
            advantage: LinearConfig::new(HIDDEN, self.num_actions).init(device),
        }
    }
}

impl<B: AutodiffBackend> QNetwork<B> for DuelingNet<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(input));
        let x = relu(self.conv2.forward(x));
        let x = flatten(relu(self.conv3.forward(x)));

        let value = relu(self.value_hidden.forward(x.clone()));
        let value = relu(self.value.forward(value));
        let advantage = relu(self.advantage_hidden.forward(x));
        let advantage = relu(self.advantage.forward(advantage));

        let [_, num_actions] = advantage.dims();
        let max_advantage = advantage.clone().max_dim(1).repeat(1, num_actions);
        advantage - max_advantage + value.repeat(1, num_actions)
    }
}
