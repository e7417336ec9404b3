use core::{convert::Infallible, ptr::NonNull};

use embedded_hal::digital::{ErrorType, InputPin};
use log::debug;

use crate::domain::{entity::OutputLine, ports::OutputRegisters};

const GPIO_OUT_REG: usize = 0x04;
const GPIO_OUT_W1TS_REG: usize = 0x08;
const GPIO_OUT_W1TC_REG: usize = 0x0C;
const GPIO_ENABLE_W1TS_REG: usize = 0x24;
const GPIO_IN_REG: usize = 0x3C;

/// Bytes of the register block touched by the drivers
pub const REGISTER_SPAN: usize = GPIO_IN_REG + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterMapError {
    NullBase,
    Misaligned,
    /// Only GPIO0..=31 live in the first register bank
    PinOutOfRange(u8),
}

#[derive(Clone, Copy)]
struct RegisterBlock {
    base: NonNull<u32>,
}

impl RegisterBlock {
    fn new(base: usize) -> Result<Self, RegisterMapError> {
        if base % core::mem::align_of::<u32>() != 0 {
            return Err(RegisterMapError::Misaligned);
        }
        let base = NonNull::new(base as *mut u32).ok_or(RegisterMapError::NullBase)?;
        Ok(Self { base })
    }

    fn read(self, offset: usize) -> u32 {
        // SAFETY: offset < REGISTER_SPAN, validity checked by the mapping caller
        unsafe { self.base.as_ptr().byte_add(offset).read_volatile() }
    }

    fn write(self, offset: usize, value: u32) {
        // SAFETY: offset < REGISTER_SPAN, validity checked by the mapping caller
        unsafe { self.base.as_ptr().byte_add(offset).write_volatile(value) }
    }
}

fn pin_mask(pin: u8) -> Result<u32, RegisterMapError> {
    if pin < 32 {
        Ok(1 << pin)
    } else {
        Err(RegisterMapError::PinOutOfRange(pin))
    }
}

/// Output lines driven through the write-1-to-set / write-1-to-clear
/// registers of the ESP32 GPIO block.
///
/// Every set or clear is a single register write, so concurrent users
/// never corrupt each other's lines.
pub struct GpioOutputBlock {
    block: RegisterBlock,
    masks: [u32; 3],
}

impl GpioOutputBlock {
    /// Map the register block and enable the three lines as outputs.
    ///
    /// # Safety
    ///
    /// `base` must address a GPIO register block (or memory standing in for
    /// one) of at least [`REGISTER_SPAN`] bytes that stays valid for the
    /// lifetime of the returned value.
    pub unsafe fn map(base: usize, lines: [u8; 3]) -> Result<Self, RegisterMapError> {
        let block = RegisterBlock::new(base)?;
        let masks = [pin_mask(lines[0])?, pin_mask(lines[1])?, pin_mask(lines[2])?];

        block.write(GPIO_ENABLE_W1TS_REG, masks[0] | masks[1] | masks[2]);
        debug!("registers: outputs {:?} enabled at {:#x}", lines, base);
        Ok(Self { block, masks })
    }

    fn mask(&self, line: OutputLine) -> u32 {
        self.masks[line.index()]
    }
}

impl OutputRegisters for GpioOutputBlock {
    fn set_line(&self, line: OutputLine) {
        self.block.write(GPIO_OUT_W1TS_REG, self.mask(line));
    }

    fn clear_line(&self, line: OutputLine) {
        self.block.write(GPIO_OUT_W1TC_REG, self.mask(line));
    }

    fn is_set(&self, line: OutputLine) -> bool {
        self.block.read(GPIO_OUT_REG) & self.mask(line) != 0
    }
}

// SAFETY: all register accesses are single volatile word accesses
unsafe impl Send for GpioOutputBlock {}
unsafe impl Sync for GpioOutputBlock {}

/// Live level of one input line, read from the GPIO input register.
pub struct GpioInputLine {
    block: RegisterBlock,
    mask: u32,
}

impl GpioInputLine {
    /// # Safety
    ///
    /// Same contract as [`GpioOutputBlock::map`].
    pub unsafe fn map(base: usize, pin: u8) -> Result<Self, RegisterMapError> {
        Ok(Self {
            block: RegisterBlock::new(base)?,
            mask: pin_mask(pin)?,
        })
    }
}

impl ErrorType for GpioInputLine {
    type Error = Infallible;
}

impl InputPin for GpioInputLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.block.read(GPIO_IN_REG) & self.mask != 0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.block.read(GPIO_IN_REG) & self.mask == 0)
    }
}

// SAFETY: reads are single volatile word accesses
unsafe impl Send for GpioInputLine {}
