pub mod pong;

pub use pong::{Pong, PongAction};
