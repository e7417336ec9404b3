use embassy_time::{Duration, Timer};
use log::debug;

use crate::domain::{
    entity::{OutputLine, Sequence},
    ports::OutputRegisters,
};

/// Plays the fixed lamp sequences on the output registers.
///
/// Playback blocks the calling task for the whole sequence and cannot be
/// cancelled.
pub struct AnimationPlayer<R> {
    registers: R,
    hold: Duration,
}

impl<R: OutputRegisters> AnimationPlayer<R> {
    pub const fn new(registers: R, hold: Duration) -> Self {
        Self { registers, hold }
    }

    /// Pulse every line of the sequence in order: high, hold, low.
    pub async fn play(&self, sequence: Sequence) {
        debug!("animation: playing {:?}", sequence);
        for line in sequence.lines() {
            self.registers.set_line(line);
            Timer::after(self.hold).await;
            self.registers.clear_line(line);
        }
    }

    pub fn set_line(&self, line: OutputLine) {
        self.registers.set_line(line);
    }

    pub fn clear_line(&self, line: OutputLine) {
        self.registers.clear_line(line);
    }

    pub fn clear_all(&self) {
        for line in OutputLine::ALL {
            self.registers.clear_line(line);
        }
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }
}
