#![allow(clippy::unreadable_literal)]

use embassy_time::Duration;

/// Timing of the edge pipelines and the output animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampConfig {
    /// Minimum quiet interval between two accepted edges on the same signal
    pub quiet_interval: Duration,
    /// Pause before the detection line level is re-checked
    pub settle_delay: Duration,
    /// Time each output line is held high during an animation
    pub hold: Duration,
}

impl LampConfig {
    pub const fn new() -> Self {
        LAMP
    }
}

impl Default for LampConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Physical wiring of the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioConfig {
    /// Base address of the GPIO register block
    pub register_base: usize,
    /// GPIO numbers of output lines A, B and C
    pub lines: [u8; 3],
    /// Rising edge: object placed
    pub detection_pin: u8,
    /// Falling edge: object removed
    pub removal_pin: u8,
}

pub const LAMP: LampConfig = LampConfig {
    quiet_interval: Duration::from_millis(100),
    settle_delay: Duration::from_millis(50),
    hold: Duration::from_millis(100),
};

pub const GPIO: GpioConfig = GpioConfig {
    register_base: 0x3FF4_4000,
    lines: [25, 26, 27],
    detection_pin: 4,
    removal_pin: 5,
};

#[macro_export]
macro_rules! detection_gpio {
    ($p:expr) => {
        $p.GPIO4
    };
}

#[macro_export]
macro_rules! removal_gpio {
    ($p:expr) => {
        $p.GPIO5
    };
}

#[macro_export]
macro_rules! lamp_gpios {
    ($p:expr) => {
        ($p.GPIO25, $p.GPIO26, $p.GPIO27)
    };
}
