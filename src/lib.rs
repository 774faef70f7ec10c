//! A deep Q-network learner that plays games from raw pixel frames
//!
//! The environment feeds a [`DeepQLearner`] one screen capture per tick. The learner preprocesses
//! frames into stacked states, stores transitions in a replay memory, and trains a convolutional
//! [`QFunction`](approx::QFunction) on sampled batches once burn-in is over.

/// The learning loop
pub mod algo;

/// Function approximators mapping stacked states to action values
pub mod approx;

/// Learner configuration
pub mod config;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment adapter
pub mod env;

/// Errors
pub mod error;

/// Exploration policies
pub mod exploration;

/// Experience replay
pub mod memory;

/// Frame preprocessing and state stacking
pub mod preprocess;

/// Helper traits
pub mod traits;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use algo::dqn::DeepQLearner;
pub use config::LearnerConfig;
pub use error::{Error, Result};
