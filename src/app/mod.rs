mod activation;
mod animation;

pub use activation::{ControllerSnapshot, LampController};
pub use animation::AnimationPlayer;
