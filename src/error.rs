use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the learner and its function approximator
#[derive(Error, Debug)]
pub enum Error {
    /// A hyperparameter combination the learner cannot run with
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A restore was requested from a checkpoint path that does not exist
    #[error("no such checkpoint path {}", .0.display())]
    MissingCheckpoint(PathBuf),

    /// The approximator failed to write or read its checkpoint
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// A transition was used as a training sample before its reward was observed
    #[error("transition {seq} was sampled before its reward was observed")]
    UnobservedReward { seq: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
