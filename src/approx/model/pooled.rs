use burn::{
    nn::{conv::Conv2d, pool::MaxPool2d, Linear, LinearConfig},
    prelude::*,
    tensor::{activation::relu, backend::AutodiffBackend},
};

use super::{flatten, NetworkConfig, QNetwork};

const HIDDEN: usize = 256;

/// Like [`StandardNet`](super::StandardNet), but each convolution is followed by 2x2 max pooling,
/// which shrinks the fully connected head considerably
#[derive(Module, Debug)]
pub struct PooledNet<B: Backend> {
    conv1: Conv2d<B>,
    pool1: MaxPool2d,
    conv2: Conv2d<B>,
    pool2: MaxPool2d,
    conv3: Conv2d<B>,
    pool3: MaxPool2d,
    fc1: Linear<B>,
    fc2: Linear<B>,
}

impl NetworkConfig {
    pub fn init_pooled<B: Backend>(&self, device: &B::Device) -> PooledNet<B> {
        let mut size = self.input_size();
        let conv1 = self.conv_layer(0, &mut size, device);
        let pool1 = size.pool();
        let conv2 = self.conv_layer(1, &mut size, device);
        let pool2 = size.pool();
        let conv3 = self.conv_layer(2, &mut size, device);
        let pool3 = size.pool();
        let flat = self.conv_channels[2] * size.area();

        PooledNet {
            conv1,
            pool1,
            conv2,
            pool2,
            conv3,
            pool3,
            fc1: LinearConfig::new(flat, HIDDEN).init(device),
            fc2: LinearConfig::new(HIDDEN, self.num_actions).init(device),
        }
    }
}

impl<B: AutodiffBackend> QNetwork<B> for PooledNet<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.pool1.forward(relu(self.conv1.forward(input)));
        let x = self.pool2.forward(relu(self.conv2.forward(x)));
        let x = self.pool3.forward(relu(self.conv3.forward(x)));
        let x = relu(self.fc1.forward(flatten(x)));
        self.fc2.forward(x)
    }
}
