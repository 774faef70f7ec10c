use burn::{
    module::AutodiffModule,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

mod dueling;
mod pooled;
mod standard;

pub use dueling::DuelingNet;
pub use pooled::PooledNet;
pub use standard::StandardNet;

/// A burn module mapping a batch of stacked states to action values
pub trait QNetwork<B: AutodiffBackend>: AutodiffModule<B> {
    /// Forward pass through the model
    ///
    /// `[batch, frames, height, width]` in, `[batch, actions]` out
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2>;
}

/// Which network topology to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// Three convolutions and two fully connected layers
    Standard,
    /// Max pooling after every convolution, with a smaller fully connected head
    Pooled,
    /// Separate value and advantage streams recombined into action values
    Dueling,
}

impl Architecture {
    /// Pooling takes precedence, the dueling split only exists on top of the unpooled trunk
    pub fn from_flags(pooling: bool, dueling: bool) -> Self {
        match (pooling, dueling) {
            (true, _) => Self::Pooled,
            (false, true) => Self::Dueling,
            (false, false) => Self::Standard,
        }
    }
}

#[derive(Config, Debug)]
pub struct NetworkConfig {
    /// Input channels, one per stacked frame
    pub state_frames: usize,
    pub frame_height: usize,
    pub frame_width: usize,
    /// Size of the action set, one output per action
    pub num_actions: usize,
    #[config(default = "[32, 64, 64]")]
    pub conv_channels: [usize; 3],
}

/// (kernel, stride) of the three convolutions
const CONV_LAYERS: [(usize, usize); 3] = [(8, 4), (4, 2), (3, 1)];
const POOL_SIZE: usize = 2;

/// Symmetric padding that yields `ceil(size / stride)` outputs for a window of `kernel`,
/// along with the output size burn will actually produce with it
pub(crate) fn same_padding(size: usize, kernel: usize, stride: usize) -> (usize, usize) {
    let target = size.div_ceil(stride);
    let total = ((target - 1) * stride + kernel).saturating_sub(size);
    let padding = total.div_ceil(2);
    let out = (size + 2 * padding - kernel) / stride + 1;
    (padding, out)
}

/// Spatial size of a feature map, tracked through the layers as they are built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FeatureSize {
    pub height: usize,
    pub width: usize,
}

impl FeatureSize {
    pub fn area(&self) -> usize {
        self.height * self.width
    }

    pub(crate) fn conv<B: Backend>(
        &mut self,
        channels: [usize; 2],
        kernel: usize,
        stride: usize,
        device: &B::Device,
    ) -> Conv2d<B> {
        let (pad_h, height) = same_padding(self.height, kernel, stride);
        let (pad_w, width) = same_padding(self.width, kernel, stride);
        *self = Self { height, width };
        Conv2dConfig::new(channels, [kernel, kernel])
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Explicit(pad_h, pad_w))
            .init(device)
    }

    pub(crate) fn pool(&mut self) -> MaxPool2d {
        let (pad_h, height) = same_padding(self.height, POOL_SIZE, POOL_SIZE);
        let (pad_w, width) = same_padding(self.width, POOL_SIZE, POOL_SIZE);
        *self = Self { height, width };
        MaxPool2dConfig::new([POOL_SIZE, POOL_SIZE])
            .with_strides([POOL_SIZE, POOL_SIZE])
            .with_padding(PaddingConfig2d::Explicit(pad_h, pad_w))
            .init()
    }
}

impl NetworkConfig {
    pub(crate) fn input_size(&self) -> FeatureSize {
        FeatureSize {
            height: self.frame_height,
            width: self.frame_width,
        }
    }

    /// The `ix`th convolution of the trunk, advancing `size` past it
    pub(crate) fn conv_layer<B: Backend>(
        &self,
        ix: usize,
        size: &mut FeatureSize,
        device: &B::Device,
    ) -> Conv2d<B> {
        let (kernel, stride) = CONV_LAYERS[ix];
        let in_channels = match ix {
            0 => self.state_frames,
            _ => self.conv_channels[ix - 1],
        };
        size.conv([in_channels, self.conv_channels[ix]], kernel, stride, device)
    }
}

/// Flatten `[batch, c, h, w]` into `[batch, c * h * w]`
pub(crate) fn flatten<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 2> {
    let [batch_size, channels, height, width] = x.dims();
    x.reshape([batch_size, channels * height * width])
}
