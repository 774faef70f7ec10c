use image::{imageops::FilterType, RgbImage};

use crate::ds::RingBuffer;

/// Largest raw channel value
const MAX_PIXEL: f32 = 255.0;

/// `K` preprocessed frames stacked channel-first, most recent frame in channel `0`
///
/// Values are stored row-major as `[K, height, width]` and lie in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedState {
    frames: usize,
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl StackedState {
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Shape as `[frames, height, width]`
    pub fn dims(&self) -> [usize; 3] {
        [self.frames, self.height, self.width]
    }

    /// The `ix`th frame of the stack, `0` being the most recent
    pub fn channel(&self, ix: usize) -> &[f32] {
        let len = self.height * self.width;
        &self.data[ix * len..(ix + 1) * len]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Raw frames retained between decision ticks, bounded to `K - 1`
pub struct FrameHistory {
    frames: RingBuffer<RgbImage>,
}

impl FrameHistory {
    pub fn new(state_frames: usize) -> Self {
        Self {
            frames: RingBuffer::new(state_frames.saturating_sub(1)),
        }
    }

    /// Retain `frame` as the most recent one, forgetting the oldest if full
    pub fn push(&mut self, frame: RgbImage) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.len() == 0
    }

    /// Whether the history holds the full `K - 1` frames
    pub fn is_full(&self) -> bool {
        self.frames.is_full()
    }

    /// Iterate most recent first
    pub fn newest_first(&self) -> impl Iterator<Item = &RgbImage> {
        self.frames.iter().rev()
    }
}

/// Turns raw RGB screen captures into normalized single-channel frames and stacks them
#[derive(Debug, Clone)]
pub struct FramePreprocessor {
    height: usize,
    width: usize,
    state_frames: usize,
}

impl FramePreprocessor {
    pub fn new(height: usize, width: usize, state_frames: usize) -> Self {
        Self {
            height,
            width,
            state_frames,
        }
    }

    /// Resize to the configured frame size, keep the brightest channel of each pixel and scale to `[0, 1]`
    ///
    /// The channel max is intentionally not a luminance weighting.
    pub fn normalize(&self, frame: &RgbImage) -> Vec<f32> {
        let (width, height) = (self.width as u32, self.height as u32);
        let resized;
        let frame = if frame.dimensions() == (width, height) {
            frame
        } else {
            resized = image::imageops::resize(frame, width, height, FilterType::Triangle);
            &resized
        };

        frame
            .pixels()
            .map(|px| px.0.into_iter().max().unwrap_or(0) as f32 / MAX_PIXEL)
            .collect()
    }

    /// Build the stacked state for `frame`
    ///
    /// With `cold_start` set, or without a full history, the normalized frame is replicated `K` times.
    /// Otherwise it is followed by the retained frames, most recent first, each normalized here.
    pub fn stack(&self, frame: &RgbImage, history: &FrameHistory, cold_start: bool) -> StackedState {
        let current = self.normalize(frame);
        let mut data = Vec::with_capacity(self.state_frames * current.len());

        if cold_start || !history.is_full() {
            for _ in 0..self.state_frames {
                data.extend_from_slice(&current);
            }
        } else {
            data.extend(current);
            for recent in history.newest_first().take(self.state_frames - 1) {
                data.extend(self.normalize(recent));
            }
        }

        StackedState {
            frames: self.state_frames,
            height: self.height,
            width: self.width,
            data,
        }
    }
}
