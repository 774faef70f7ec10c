mod replay;
mod transition;

pub use replay::ReplayMemory;
pub use transition::Transition;
