#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod config;
pub mod controllers;
pub mod domain;
pub mod edge;
pub mod infrastructure;

pub use app::{AnimationPlayer, ControllerSnapshot, LampController};
pub use controllers::{ChannelEndpoint, ChannelReading, ControlChannel};
pub use domain::entity::{EdgeSignal, LampCommand, LampState, OutputLine, Sequence};
pub use domain::ports::{ChannelError, ChannelHost, OutputRegisters};

#[cfg(feature = "esp32")]
#[macro_export]
// Create a static cell for a given type and value
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}
